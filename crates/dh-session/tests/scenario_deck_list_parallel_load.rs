//! Deck-list loading: only the session account's decks are listed, each
//! deck's info loads independently, and one deck's load failure does not
//! fail the list.

use std::sync::Arc;

use dh_ledger::LedgerOp;
use dh_ledger_mem::{InjectedFailure, MemoryLedger};
use dh_schemas::{AccountAddress, CardId, DeckId, SessionContext, SupportCards};
use dh_session::{DeckService, DeckSummary, LoadError};

fn cards(pairs: &[(u64, u32)]) -> SupportCards {
    pairs
        .iter()
        .map(|(id, count)| (CardId::new(*id), *count))
        .collect()
}

fn seeded_ledger() -> (AccountAddress, Arc<MemoryLedger>) {
    let account = AccountAddress::new("0xaaa");
    let ledger = Arc::new(MemoryLedger::new(account.clone()));
    ledger.seed_deck(
        DeckId::new(1),
        account.clone(),
        CardId::new(10),
        cards(&[(1, 2), (2, 1)]),
    );
    ledger.seed_deck(DeckId::new(2), account.clone(), CardId::NONE, cards(&[(3, 5)]));
    ledger.seed_deck(
        DeckId::new(3),
        AccountAddress::new("0xbbb"),
        CardId::new(99),
        cards(&[]),
    );
    (account, ledger)
}

#[tokio::test]
async fn scenario_deck_list_loads_owned_decks() {
    let (account, ledger) = seeded_ledger();
    let service = DeckService::new(ledger, SessionContext::connected(account));

    let summaries = service.load_player_decks().await.unwrap();
    assert_eq!(
        summaries,
        vec![
            DeckSummary {
                deck_id: DeckId::new(1),
                battle_card: CardId::new(10),
                support_total: 3,
            },
            DeckSummary {
                deck_id: DeckId::new(2),
                battle_card: CardId::NONE,
                support_total: 5,
            },
        ]
    );
}

#[tokio::test]
async fn scenario_one_failed_deck_does_not_fail_the_list() {
    let (account, ledger) = seeded_ledger();
    ledger.inject_failure(LedgerOp::GetBattleCard, InjectedFailure::Transport);
    let service = DeckService::new(ledger, SessionContext::connected(account));

    let summaries = service.load_player_decks().await.unwrap();
    assert_eq!(summaries.len(), 1);
}

#[tokio::test]
async fn scenario_enumeration_failure_fails_the_list() {
    let (account, ledger) = seeded_ledger();
    ledger.inject_failure(LedgerOp::GetPlayerDecks, InjectedFailure::Transport);
    let service = DeckService::new(ledger, SessionContext::connected(account));

    let err = service.load_player_decks().await.unwrap_err();
    assert!(matches!(err, LoadError::Ledger(_)));
}
