//! Per-sub-step reconcile bookkeeping.
//!
//! A reconcile call aggregates one report per sub-step so the host can
//! surface "support cards updated but battle card failed" instead of one
//! opaque error. Nothing here is retried; the caller offers a manual retry
//! by recomputing a delta against the partially-updated snapshot and
//! issuing a fresh reconcile.

use dh_ledger::LedgerError;
use serde::{Deserialize, Serialize};

use crate::gate::ApprovalOutcome;

/// What happened to one mutating sub-step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepReport {
    /// Nothing to submit for this sub-step.
    NoChange,
    /// The write was confirmed and the snapshot updated.
    Confirmed,
    /// The write failed; the snapshot is untouched for this sub-step.
    Failed(LedgerError),
    /// Approval was denied first; the write was never attempted.
    NotAttempted,
}

impl StepReport {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, StepReport::Confirmed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepReport::Failed(_) | StepReport::NotAttempted)
    }
}

/// Aggregate outcome of one reconcile call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub approval: ApprovalOutcome,
    pub additions: StepReport,
    pub removals: StepReport,
    pub battle_card: StepReport,
}

impl ReconcileOutcome {
    /// Outcome for a reconcile aborted at the approval gate: no write was
    /// attempted and the snapshot is untouched.
    pub(crate) fn aborted(approval: ApprovalOutcome) -> Self {
        Self {
            approval,
            additions: StepReport::NotAttempted,
            removals: StepReport::NotAttempted,
            battle_card: StepReport::NotAttempted,
        }
    }

    /// `true` when every requested change reached the ledger and the
    /// snapshot now mirrors the player's selection.
    pub fn fully_applied(&self) -> bool {
        self.approval.is_granted()
            && !self.additions.is_failure()
            && !self.removals.is_failure()
            && !self.battle_card.is_failure()
    }

    /// Sub-steps that failed, by name, for display and logs.
    pub fn failed_steps(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if self.approval.is_denied() {
            failed.push("approval");
        }
        if self.additions.is_failure() {
            failed.push("additions");
        }
        if self.removals.is_failure() {
            failed.push("removals");
        }
        if self.battle_card.is_failure() {
            failed.push("battle_card");
        }
        failed
    }
}
