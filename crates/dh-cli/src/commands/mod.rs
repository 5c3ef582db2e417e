use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use dh_delta::{battle_card_change, support_delta, BattleCardChange, SupportDelta};
use dh_ledger_mem::{load_fixture, MemoryLedger};
use dh_schemas::{CardId, DeckId, SessionContext, SupportCards};
use dh_session::DeckService;

/// On-disk shape of a deck selection: the desired battle card (0 = none)
/// and the desired support-card multiset.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionFile {
    #[serde(default)]
    battle_card: CardId,
    #[serde(default)]
    support_cards: SupportCards,
}

fn read_selection(path: &Path) -> Result<SelectionFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading selection {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing selection {}", path.display()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn service_for(fixture: &Path) -> Result<DeckService<MemoryLedger>> {
    let ledger = load_fixture(fixture)?;
    let ctx = SessionContext::connected(ledger.signer().clone());
    Ok(DeckService::new(Arc::new(ledger), ctx))
}

#[derive(Debug, Serialize)]
struct DiffOutput {
    battle_card: BattleCardChange,
    support: SupportDelta,
}

pub fn diff(old: &Path, new: &Path) -> Result<()> {
    let old = read_selection(old)?;
    let new = read_selection(new)?;
    print_json(&DiffOutput {
        battle_card: battle_card_change(old.battle_card, new.battle_card),
        support: support_delta(&old.support_cards, &new.support_cards),
    })
}

pub async fn show(fixture: &Path, deck: u64) -> Result<()> {
    let service = service_for(fixture)?;
    let snapshot = service.load_deck(DeckId::new(deck)).await?;
    print_json(&snapshot)
}

pub async fn decks(fixture: &Path) -> Result<()> {
    let service = service_for(fixture)?;
    let summaries = service.load_player_decks().await?;
    print_json(&summaries)
}

pub async fn reconcile(fixture: &Path, deck: u64, selection: &Path) -> Result<()> {
    let selection = read_selection(selection)?;
    let service = service_for(fixture)?;

    let mut snapshot = service.load_deck(DeckId::new(deck)).await?;
    let delta = support_delta(snapshot.support_cards(), &selection.support_cards);
    let outcome = service
        .reconcile(&mut snapshot, &delta, selection.battle_card)
        .await?;

    print_json(&outcome)?;
    if !outcome.fully_applied() {
        bail!(
            "reconcile finished with failed sub-steps: {}",
            outcome.failed_steps().join(", ")
        );
    }
    Ok(())
}

pub fn config_digest(paths: &[PathBuf]) -> Result<()> {
    let merged = dh_config::merged_value(paths)?;
    dh_config::scan_for_secrets(&merged)?;
    println!("{}", dh_config::config_digest(&merged));
    println!("{merged}");
    Ok(())
}

pub fn config_check(paths: &[PathBuf]) -> Result<()> {
    let config = dh_config::load_layered(paths)?;
    print_json(&config)
}
