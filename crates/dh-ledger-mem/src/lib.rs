//! Deterministic in-memory deck ledger.
//!
//! Design decisions (kept intentionally simple/deterministic):
//! - Transaction handles are stable strings: "mem:tx:{seq}:{op}".
//! - No randomness. No timestamps. BTreeMap iteration everywhere.
//! - Writes apply synchronously at submit time; `await_receipt` only looks
//!   up the recorded status. Failure injection (below) is the one exception.
//! - The operator-approval precondition is enforced the way the real ledger
//!   enforces it: every mutating deck operation is rejected while the
//!   signer's approval flag is unset.
//! - A removal exceeding the on-ledger count is rejected outright; the
//!   ledger never underflows.
//!
//! Failure injection is one-shot per operation, armed via
//! [`MemoryLedger::inject_failure`]:
//! - [`InjectedFailure::Transport`] — the call itself errors; no handle, no
//!   state change.
//! - [`InjectedFailure::Reverted`] — the write returns a handle whose
//!   receipt reports failure; no state change.
//! - [`InjectedFailure::StaleRead`] — the write is confirmed but subsequent
//!   reads do not reflect it, simulating an eventually-consistent read
//!   lagging the receipt.
//!
//! Every submitted operation is recorded and exposed through
//! [`MemoryLedger::submitted_ops`] so scenario tests can assert exactly
//! which writes were issued.

mod fixture;

pub use fixture::{load_fixture, DeckFixture, LedgerFixture};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use dh_ledger::{DeckLedger, LedgerError, LedgerOp, TxHandle, TxReceipt, TxStatus};
use dh_schemas::{AccountAddress, CardId, DeckId, SupportCardEntry, SupportCards};

/// One-shot failure mode armed against a single operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectedFailure {
    /// The call errors before a receipt is obtainable.
    Transport,
    /// The write is accepted but its receipt reports failure.
    Reverted,
    /// The write is confirmed but reads keep showing the old state.
    StaleRead,
}

#[derive(Clone, Debug)]
struct DeckRecord {
    owner: AccountAddress,
    battle_card: CardId,
    support_cards: SupportCards,
}

#[derive(Debug, Default)]
struct LedgerState {
    decks: BTreeMap<DeckId, DeckRecord>,
    approvals: BTreeSet<AccountAddress>,
    receipts: BTreeMap<TxHandle, TxStatus>,
    submitted: Vec<LedgerOp>,
    injected: BTreeMap<LedgerOp, InjectedFailure>,
    tx_seq: u64,
}

/// In-memory [`DeckLedger`] bound to a single signing account, the way a
/// wallet-backed transport is. Mutating calls are checked against that
/// signer: deck ownership and the operator-approval flag.
pub struct MemoryLedger {
    signer: AccountAddress,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new(signer: AccountAddress) -> Self {
        Self {
            signer,
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub fn signer(&self) -> &AccountAddress {
        &self.signer
    }

    /// Seed a deck directly, bypassing the write path. Zero counts are
    /// dropped so the stored multiset keeps its invariant.
    pub fn seed_deck(
        &self,
        deck: DeckId,
        owner: AccountAddress,
        battle_card: CardId,
        support_cards: SupportCards,
    ) {
        let mut state = self.lock();
        state.decks.insert(
            deck,
            DeckRecord {
                owner,
                battle_card,
                support_cards: support_cards
                    .into_iter()
                    .filter(|(_, count)| *count > 0)
                    .collect(),
            },
        );
    }

    /// Set the operator-approval flag directly, bypassing the write path.
    pub fn grant_approval(&self, account: AccountAddress) {
        self.lock().approvals.insert(account);
    }

    /// Arm a one-shot failure against the next call of `op`.
    pub fn inject_failure(&self, op: LedgerOp, failure: InjectedFailure) {
        self.lock().injected.insert(op, failure);
    }

    /// Every operation submitted so far, in order.
    pub fn submitted_ops(&self) -> Vec<LedgerOp> {
        self.lock().submitted.clone()
    }

    /// Submitted operations that would mutate ledger state.
    pub fn submitted_mutations(&self) -> Vec<LedgerOp> {
        self.lock()
            .submitted
            .iter()
            .copied()
            .filter(LedgerOp::is_mutating)
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        // A poisoned lock means a test already panicked; propagating the
        // panic here is fine.
        self.state.lock().expect("memory ledger lock poisoned")
    }

    fn take_injection(state: &mut LedgerState, op: LedgerOp) -> Option<InjectedFailure> {
        state.injected.remove(&op)
    }

    /// Shared read-path entry: records nothing, honors transport injection.
    /// Other injection modes only make sense on writes and are left armed.
    fn begin_read(state: &mut LedgerState, op: LedgerOp) -> Result<(), LedgerError> {
        if matches!(state.injected.get(&op), Some(InjectedFailure::Transport)) {
            state.injected.remove(&op);
            return Err(LedgerError::transport(op, "injected transport failure"));
        }
        Ok(())
    }

    /// Shared write path: injection handling, op log, handle + receipt
    /// bookkeeping. `apply` validates and applies the state change; a
    /// validation error surfaces as an immediate rejection with no handle.
    fn submit_write(
        &self,
        op: LedgerOp,
        apply: impl FnOnce(&mut LedgerState) -> Result<(), String>,
    ) -> Result<TxHandle, LedgerError> {
        let mut state = self.lock();

        if let Some(InjectedFailure::Transport) = state.injected.get(&op) {
            state.injected.remove(&op);
            return Err(LedgerError::transport(op, "injected transport failure"));
        }

        state.submitted.push(op);

        state.tx_seq += 1;
        let handle = TxHandle::new(format!("mem:tx:{}:{}", state.tx_seq, op));

        match Self::take_injection(&mut state, op) {
            Some(InjectedFailure::Reverted) => {
                state.receipts.insert(handle.clone(), TxStatus::Failure);
                return Ok(handle);
            }
            Some(InjectedFailure::StaleRead) => {
                state.receipts.insert(handle.clone(), TxStatus::Success);
                return Ok(handle);
            }
            _ => {}
        }

        apply(&mut state).map_err(|reason| LedgerError::rejected(op, reason))?;

        state.receipts.insert(handle.clone(), TxStatus::Success);
        Ok(handle)
    }

    /// Preconditions shared by every mutating deck operation: the signer
    /// must hold operator approval and must own the deck.
    fn deck_for_mutation<'a>(
        state: &'a mut LedgerState,
        signer: &AccountAddress,
        deck: DeckId,
    ) -> Result<&'a mut DeckRecord, String> {
        if !state.approvals.contains(signer) {
            return Err("operator approval missing".to_string());
        }
        let record = state
            .decks
            .get_mut(&deck)
            .ok_or_else(|| format!("unknown deck {deck}"))?;
        if record.owner != *signer {
            return Err(format!("{signer} does not own {deck}"));
        }
        Ok(record)
    }
}

#[async_trait]
impl DeckLedger for MemoryLedger {
    async fn get_battle_card(&self, deck: DeckId) -> Result<CardId, LedgerError> {
        let mut state = self.lock();
        Self::begin_read(&mut state, LedgerOp::GetBattleCard)?;
        state
            .decks
            .get(&deck)
            .map(|record| record.battle_card)
            .ok_or_else(|| LedgerError::rejected(LedgerOp::GetBattleCard, format!("unknown deck {deck}")))
    }

    async fn get_all_support_cards(&self, deck: DeckId) -> Result<SupportCards, LedgerError> {
        let mut state = self.lock();
        Self::begin_read(&mut state, LedgerOp::GetAllSupportCards)?;
        state
            .decks
            .get(&deck)
            .map(|record| record.support_cards.clone())
            .ok_or_else(|| {
                LedgerError::rejected(LedgerOp::GetAllSupportCards, format!("unknown deck {deck}"))
            })
    }

    async fn get_player_decks(&self, account: &AccountAddress) -> Result<Vec<DeckId>, LedgerError> {
        let mut state = self.lock();
        Self::begin_read(&mut state, LedgerOp::GetPlayerDecks)?;
        Ok(state
            .decks
            .iter()
            .filter(|(_, record)| record.owner == *account)
            .map(|(deck, _)| *deck)
            .collect())
    }

    async fn get_approval_state(&self, account: &AccountAddress) -> Result<bool, LedgerError> {
        let mut state = self.lock();
        Self::begin_read(&mut state, LedgerOp::GetApprovalState)?;
        Ok(state.approvals.contains(account))
    }

    async fn set_approval_state(
        &self,
        account: &AccountAddress,
        approved: bool,
    ) -> Result<TxHandle, LedgerError> {
        let account = account.clone();
        let signer = self.signer.clone();
        self.submit_write(LedgerOp::SetApprovalState, move |state| {
            if account != signer {
                return Err(format!("signer {signer} cannot approve for {account}"));
            }
            if approved {
                state.approvals.insert(account);
            } else {
                state.approvals.remove(&account);
            }
            Ok(())
        })
    }

    async fn set_battle_card(&self, deck: DeckId, card: CardId) -> Result<TxHandle, LedgerError> {
        let signer = self.signer.clone();
        self.submit_write(LedgerOp::SetBattleCard, move |state| {
            if !card.is_set() {
                return Err("sentinel is not a valid battle card".to_string());
            }
            let record = Self::deck_for_mutation(state, &signer, deck)?;
            record.battle_card = card;
            Ok(())
        })
    }

    async fn remove_battle_card(&self, deck: DeckId) -> Result<TxHandle, LedgerError> {
        let signer = self.signer.clone();
        self.submit_write(LedgerOp::RemoveBattleCard, move |state| {
            let record = Self::deck_for_mutation(state, &signer, deck)?;
            record.battle_card = CardId::NONE;
            Ok(())
        })
    }

    async fn add_support_cards(
        &self,
        deck: DeckId,
        cards: &[SupportCardEntry],
    ) -> Result<TxHandle, LedgerError> {
        let signer = self.signer.clone();
        let cards = cards.to_vec();
        self.submit_write(LedgerOp::AddSupportCards, move |state| {
            if cards.iter().any(|entry| entry.count == 0) {
                return Err("zero-count entry".to_string());
            }
            let record = Self::deck_for_mutation(state, &signer, deck)?;
            for entry in &cards {
                *record.support_cards.entry(entry.card).or_insert(0) += entry.count;
            }
            Ok(())
        })
    }

    async fn remove_support_cards(
        &self,
        deck: DeckId,
        cards: &[SupportCardEntry],
    ) -> Result<TxHandle, LedgerError> {
        let signer = self.signer.clone();
        let cards = cards.to_vec();
        self.submit_write(LedgerOp::RemoveSupportCards, move |state| {
            let record = Self::deck_for_mutation(state, &signer, deck)?;

            // Validate the whole batch before touching anything: a removal
            // exceeding the on-ledger count rejects the entire call.
            for entry in &cards {
                let held = record.support_cards.get(&entry.card).copied().unwrap_or(0);
                if entry.count == 0 {
                    return Err("zero-count entry".to_string());
                }
                if entry.count > held {
                    return Err(format!(
                        "removal of {} x{} exceeds on-ledger count {held}",
                        entry.card, entry.count
                    ));
                }
            }

            for entry in &cards {
                let held = record.support_cards.get(&entry.card).copied().unwrap_or(0);
                let remaining = held - entry.count;
                if remaining == 0 {
                    record.support_cards.remove(&entry.card);
                } else {
                    record.support_cards.insert(entry.card, remaining);
                }
            }
            Ok(())
        })
    }

    async fn await_receipt(&self, handle: &TxHandle) -> Result<TxReceipt, LedgerError> {
        let mut state = self.lock();
        Self::begin_read(&mut state, LedgerOp::AwaitReceipt)?;
        let status = state.receipts.get(handle).copied().ok_or_else(|| {
            LedgerError::rejected(LedgerOp::AwaitReceipt, format!("unknown handle {handle}"))
        })?;
        Ok(TxReceipt {
            handle: handle.clone(),
            status,
        })
    }
}
