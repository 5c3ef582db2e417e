//! Battle-slot sentinel semantics: requesting the unset sentinel issues the
//! dedicated remove write, never a "set to 0"; occupying an empty slot
//! issues a set write.

use std::sync::Arc;

use dh_delta::SupportDelta;
use dh_ledger::LedgerOp;
use dh_ledger_mem::MemoryLedger;
use dh_schemas::{AccountAddress, CardId, DeckId, SessionContext, SupportCards};
use dh_session::{DeckService, StepReport};

#[tokio::test]
async fn scenario_sentinel_request_issues_remove_write() {
    let account = AccountAddress::new("0xaaa");
    let ledger = Arc::new(MemoryLedger::new(account.clone()));
    ledger.seed_deck(
        DeckId::new(1),
        account.clone(),
        CardId::new(10),
        SupportCards::new(),
    );
    ledger.grant_approval(account.clone());
    let service = DeckService::new(Arc::clone(&ledger), SessionContext::connected(account));

    let mut snapshot = service.load_deck(DeckId::new(1)).await.unwrap();
    let outcome = service
        .reconcile(&mut snapshot, &SupportDelta::default(), CardId::NONE)
        .await
        .unwrap();

    assert_eq!(outcome.battle_card, StepReport::Confirmed);
    assert_eq!(snapshot.battle_card(), CardId::NONE);
    assert_eq!(ledger.submitted_mutations(), vec![LedgerOp::RemoveBattleCard]);
}

#[tokio::test]
async fn scenario_occupying_empty_slot_issues_set_write() {
    let account = AccountAddress::new("0xaaa");
    let ledger = Arc::new(MemoryLedger::new(account.clone()));
    ledger.seed_deck(
        DeckId::new(1),
        account.clone(),
        CardId::NONE,
        SupportCards::new(),
    );
    ledger.grant_approval(account.clone());
    let service = DeckService::new(Arc::clone(&ledger), SessionContext::connected(account));

    let mut snapshot = service.load_deck(DeckId::new(1)).await.unwrap();
    let outcome = service
        .reconcile(&mut snapshot, &SupportDelta::default(), CardId::new(7))
        .await
        .unwrap();

    assert_eq!(outcome.battle_card, StepReport::Confirmed);
    assert_eq!(snapshot.battle_card(), CardId::new(7));
    assert_eq!(ledger.submitted_mutations(), vec![LedgerOp::SetBattleCard]);
}
