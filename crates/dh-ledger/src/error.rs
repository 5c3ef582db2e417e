use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::LedgerOp;

/// Failure of a single ledger call, scoped to the operation that issued it.
///
/// Both variants are terminal for the issuing sub-step: no state was applied
/// and the caller must not assume anything happened on the ledger beyond the
/// failed call. Neither is retried automatically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    /// The ledger processed the call and refused it: the transaction was
    /// rejected, reverted, or its receipt reported failure.
    Rejected { op: LedgerOp, reason: String },

    /// The call never completed: network or RPC failure before a receipt
    /// was obtainable. Bookkeeping treats this the same as a rejection.
    Transport { op: LedgerOp, reason: String },
}

impl LedgerError {
    pub fn rejected(op: LedgerOp, reason: impl Into<String>) -> Self {
        LedgerError::Rejected {
            op,
            reason: reason.into(),
        }
    }

    pub fn transport(op: LedgerOp, reason: impl Into<String>) -> Self {
        LedgerError::Transport {
            op,
            reason: reason.into(),
        }
    }

    /// The operation this failure is scoped to.
    pub fn op(&self) -> LedgerOp {
        match self {
            LedgerError::Rejected { op, .. } => *op,
            LedgerError::Transport { op, .. } => *op,
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Rejected { op, reason } => {
                write!(f, "ledger rejected {op}: {reason}")
            }
            LedgerError::Transport { op, reason } => {
                write!(f, "transport failure during {op}: {reason}")
            }
        }
    }
}

impl std::error::Error for LedgerError {}
