use std::fmt;

use serde::{Deserialize, Serialize};

/// One logical ledger operation. Used to scope errors and failure injection
/// to the call that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LedgerOp {
    GetBattleCard,
    GetAllSupportCards,
    GetPlayerDecks,
    GetApprovalState,
    SetApprovalState,
    SetBattleCard,
    RemoveBattleCard,
    AddSupportCards,
    RemoveSupportCards,
    AwaitReceipt,
}

impl LedgerOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerOp::GetBattleCard => "get_battle_card",
            LedgerOp::GetAllSupportCards => "get_all_support_cards",
            LedgerOp::GetPlayerDecks => "get_player_decks",
            LedgerOp::GetApprovalState => "get_approval_state",
            LedgerOp::SetApprovalState => "set_approval_state",
            LedgerOp::SetBattleCard => "set_battle_card",
            LedgerOp::RemoveBattleCard => "remove_battle_card",
            LedgerOp::AddSupportCards => "add_support_cards",
            LedgerOp::RemoveSupportCards => "remove_support_cards",
            LedgerOp::AwaitReceipt => "await_receipt",
        }
    }

    /// `true` for operations that change ledger state and therefore require
    /// operator approval before they can succeed.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            LedgerOp::SetBattleCard
                | LedgerOp::RemoveBattleCard
                | LedgerOp::AddSupportCards
                | LedgerOp::RemoveSupportCards
        )
    }
}

impl fmt::Display for LedgerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a submitted ledger transaction.
///
/// The transport decides the shape of the string; callers only ever pass it
/// back to [`crate::DeckLedger::await_receipt`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHandle(pub String);

impl TxHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        TxHandle(raw.into())
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal status reported by a transaction receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Failure,
}

/// Resolved receipt for a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub handle: TxHandle,
    pub status: TxStatus,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutating_ops_require_approval() {
        assert!(LedgerOp::AddSupportCards.is_mutating());
        assert!(LedgerOp::RemoveBattleCard.is_mutating());
        assert!(!LedgerOp::GetBattleCard.is_mutating());
        assert!(!LedgerOp::SetApprovalState.is_mutating());
    }
}
