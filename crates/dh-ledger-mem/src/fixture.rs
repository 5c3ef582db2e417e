//! YAML fixture format for seeding a [`MemoryLedger`], used by the CLI
//! harness and scenario setups.
//!
//! ```yaml
//! signer: "0xaaa"
//! approved: true
//! decks:
//!   - id: 1
//!     battle_card: 10
//!     support_cards:
//!       1: 2
//!       2: 1
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use dh_schemas::{AccountAddress, CardId, DeckId, SupportCards};

use crate::MemoryLedger;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckFixture {
    pub id: DeckId,
    /// Defaults to the fixture's signer.
    #[serde(default)]
    pub owner: Option<AccountAddress>,
    #[serde(default)]
    pub battle_card: CardId,
    #[serde(default)]
    pub support_cards: SupportCards,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerFixture {
    pub signer: AccountAddress,
    /// Seed the signer's operator-approval flag as already set.
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub decks: Vec<DeckFixture>,
}

impl LedgerFixture {
    pub fn build(&self) -> MemoryLedger {
        let ledger = MemoryLedger::new(self.signer.clone());
        if self.approved {
            ledger.grant_approval(self.signer.clone());
        }
        for deck in &self.decks {
            let owner = deck.owner.clone().unwrap_or_else(|| self.signer.clone());
            ledger.seed_deck(
                deck.id,
                owner,
                deck.battle_card,
                deck.support_cards.clone(),
            );
        }
        ledger
    }
}

/// Read and build a fixture-backed ledger from a YAML file.
pub fn load_fixture(path: &Path) -> Result<MemoryLedger> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading ledger fixture {}", path.display()))?;
    let fixture: LedgerFixture = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing ledger fixture {}", path.display()))?;
    Ok(fixture.build())
}
