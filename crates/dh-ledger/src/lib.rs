//! Deck ledger gateway seam.
//!
//! [`DeckLedger`] is the single choke-point through which the rest of the
//! workspace reaches the remote ledger. This crate defines the trait, the
//! transaction handle/receipt types, and the error taxonomy; it contains no
//! transport. Live RPC adapters implement the trait outside this workspace,
//! and `dh-ledger-mem` provides a deterministic in-memory implementation for
//! tests and offline use.
//!
//! Write operations return a [`TxHandle`] immediately; confirmation is a
//! separate suspension point via [`DeckLedger::await_receipt`]. Callers must
//! treat a write as applied only after its receipt reports success.

mod error;
mod types;

pub use error::LedgerError;
pub use types::{LedgerOp, TxHandle, TxReceipt, TxStatus};

use async_trait::async_trait;
use dh_schemas::{AccountAddress, CardId, DeckId, SupportCardEntry, SupportCards};

/// Asynchronous gateway to the deck ledger.
///
/// Implementations are shared, stateless-per-call resources: the ledger
/// itself serializes writes to a given deck, so no client-side locking is
/// required here. Session-level sequencing lives in `dh-session`.
#[async_trait]
pub trait DeckLedger: Send + Sync {
    /// The card occupying the deck's battle slot; the sentinel when unset.
    async fn get_battle_card(&self, deck: DeckId) -> Result<CardId, LedgerError>;

    /// The deck's full support-card multiset.
    async fn get_all_support_cards(&self, deck: DeckId) -> Result<SupportCards, LedgerError>;

    /// All decks owned by the given account.
    async fn get_player_decks(&self, account: &AccountAddress) -> Result<Vec<DeckId>, LedgerError>;

    /// Whether the deck contract is approved as an operator for the account.
    async fn get_approval_state(&self, account: &AccountAddress) -> Result<bool, LedgerError>;

    /// Set or clear the operator-approval flag for the account.
    async fn set_approval_state(
        &self,
        account: &AccountAddress,
        approved: bool,
    ) -> Result<TxHandle, LedgerError>;

    /// Occupy or replace the deck's battle slot. `card` must not be the
    /// unset sentinel; clearing the slot is [`DeckLedger::remove_battle_card`].
    async fn set_battle_card(&self, deck: DeckId, card: CardId) -> Result<TxHandle, LedgerError>;

    /// Clear the deck's battle slot.
    async fn remove_battle_card(&self, deck: DeckId) -> Result<TxHandle, LedgerError>;

    /// Add the given entries to the deck's support multiset.
    async fn add_support_cards(
        &self,
        deck: DeckId,
        cards: &[SupportCardEntry],
    ) -> Result<TxHandle, LedgerError>;

    /// Remove the given entries from the deck's support multiset. The ledger
    /// rejects a removal exceeding the on-ledger count.
    async fn remove_support_cards(
        &self,
        deck: DeckId,
        cards: &[SupportCardEntry],
    ) -> Result<TxHandle, LedgerError>;

    /// Resolve a previously returned handle to its terminal receipt.
    async fn await_receipt(&self, handle: &TxHandle) -> Result<TxReceipt, LedgerError>;
}
