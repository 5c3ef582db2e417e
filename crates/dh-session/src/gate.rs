//! Operator-approval gate.
//!
//! The ledger enforces an operator-authorization precondition on every
//! mutating deck operation; a write submitted without it always fails.
//! [`ensure_approval`] therefore runs before the first write of a
//! reconcile: read the flag, and if unset submit the approval transaction,
//! await its receipt, and re-read the flag. Only a success receipt **and**
//! a confirming re-read grant approval — an eventually-consistent read can
//! lag the receipt, and a write issued in that window would still fail.
//!
//! This is a check-then-act with a confirmation re-read, not a lock:
//! concurrent sessions against the same account are kept out by the
//! per-deck guard in [`crate::DeckService`].

use std::fmt;

use dh_ledger::{DeckLedger, LedgerError};
use dh_schemas::SessionContext;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Why approval could not be confirmed. All variants mean the same thing to
/// the coordinator: no mutating write may be attempted this session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDenial {
    /// A ledger call failed (flag query, approval submit, or receipt await).
    Call(LedgerError),
    /// The approval transaction's receipt reported failure.
    ReceiptFailed,
    /// The receipt reported success but the re-read still shows the flag
    /// unset.
    Unconfirmed,
}

impl fmt::Display for ApprovalDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalDenial::Call(err) => write!(f, "approval call failed: {err}"),
            ApprovalDenial::ReceiptFailed => {
                write!(f, "approval transaction receipt reported failure")
            }
            ApprovalDenial::Unconfirmed => {
                write!(f, "approval flag still unset after confirmed transaction")
            }
        }
    }
}

impl std::error::Error for ApprovalDenial {}

/// Result of the approval gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalOutcome {
    /// The flag was already set; no transaction was needed.
    AlreadyGranted,
    /// The approval transaction was submitted, confirmed, and re-read.
    Granted,
    /// Approval could not be confirmed; no mutating write may follow.
    Denied(ApprovalDenial),
}

impl ApprovalOutcome {
    pub fn is_granted(&self) -> bool {
        !self.is_denied()
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, ApprovalOutcome::Denied(_))
    }
}

/// Confirm the operator-approval flag is set, setting it if necessary.
pub async fn ensure_approval<L>(ledger: &L, ctx: &SessionContext) -> ApprovalOutcome
where
    L: DeckLedger + ?Sized,
{
    match ledger.get_approval_state(&ctx.account).await {
        Ok(true) => return ApprovalOutcome::AlreadyGranted,
        Ok(false) => {}
        Err(err) => return ApprovalOutcome::Denied(ApprovalDenial::Call(err)),
    }

    info!(account = %ctx.account, "operator approval unset, submitting approval transaction");

    let handle = match ledger.set_approval_state(&ctx.account, true).await {
        Ok(handle) => handle,
        Err(err) => {
            warn!(error = %err, "approval transaction could not be submitted");
            return ApprovalOutcome::Denied(ApprovalDenial::Call(err));
        }
    };

    let receipt = match ledger.await_receipt(&handle).await {
        Ok(receipt) => receipt,
        Err(err) => {
            warn!(error = %err, "approval receipt could not be resolved");
            return ApprovalOutcome::Denied(ApprovalDenial::Call(err));
        }
    };

    if !receipt.is_success() {
        warn!(handle = %handle, "approval transaction reverted");
        return ApprovalOutcome::Denied(ApprovalDenial::ReceiptFailed);
    }

    match ledger.get_approval_state(&ctx.account).await {
        Ok(true) => ApprovalOutcome::Granted,
        Ok(false) => {
            warn!(handle = %handle, "approval confirmed but flag re-read shows unset");
            ApprovalOutcome::Denied(ApprovalDenial::Unconfirmed)
        }
        Err(err) => ApprovalOutcome::Denied(ApprovalDenial::Call(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_ledger::LedgerOp;
    use dh_ledger_mem::{InjectedFailure, MemoryLedger};
    use dh_schemas::AccountAddress;

    fn session(ledger: &MemoryLedger) -> SessionContext {
        SessionContext::connected(ledger.signer().clone())
    }

    #[tokio::test]
    async fn already_set_flag_skips_the_transaction() {
        let ledger = MemoryLedger::new(AccountAddress::new("0xaaa"));
        ledger.grant_approval(AccountAddress::new("0xaaa"));

        let outcome = ensure_approval(&ledger, &session(&ledger)).await;
        assert_eq!(outcome, ApprovalOutcome::AlreadyGranted);
        assert!(ledger.submitted_ops().is_empty());
    }

    #[tokio::test]
    async fn unset_flag_is_set_and_confirmed() {
        let ledger = MemoryLedger::new(AccountAddress::new("0xaaa"));

        let outcome = ensure_approval(&ledger, &session(&ledger)).await;
        assert_eq!(outcome, ApprovalOutcome::Granted);
        assert_eq!(ledger.submitted_ops(), vec![LedgerOp::SetApprovalState]);
    }

    #[tokio::test]
    async fn reverted_approval_transaction_denies() {
        let ledger = MemoryLedger::new(AccountAddress::new("0xaaa"));
        ledger.inject_failure(LedgerOp::SetApprovalState, InjectedFailure::Reverted);

        let outcome = ensure_approval(&ledger, &session(&ledger)).await;
        assert_eq!(
            outcome,
            ApprovalOutcome::Denied(ApprovalDenial::ReceiptFailed)
        );
    }

    #[tokio::test]
    async fn confirmed_but_unread_flag_denies() {
        let ledger = MemoryLedger::new(AccountAddress::new("0xaaa"));
        ledger.inject_failure(LedgerOp::SetApprovalState, InjectedFailure::StaleRead);

        let outcome = ensure_approval(&ledger, &session(&ledger)).await;
        assert_eq!(outcome, ApprovalOutcome::Denied(ApprovalDenial::Unconfirmed));
    }

    #[tokio::test]
    async fn transport_failure_on_submit_denies() {
        let ledger = MemoryLedger::new(AccountAddress::new("0xaaa"));
        ledger.inject_failure(LedgerOp::SetApprovalState, InjectedFailure::Transport);

        let outcome = ensure_approval(&ledger, &session(&ledger)).await;
        assert!(matches!(
            outcome,
            ApprovalOutcome::Denied(ApprovalDenial::Call(LedgerError::Transport { .. }))
        ));
    }
}
