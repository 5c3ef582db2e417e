//! dh-session
//!
//! Deck edit sessions against the remote ledger.
//!
//! Architectural decisions:
//! - Snapshot is loaded once per session and mutated only on confirmed
//!   receipts; a failed write leaves the mirror exactly as it was
//! - Operator approval is confirmed (receipt + re-read) before any
//!   mutating write; denial aborts the whole reconcile
//! - Sub-step order is additions, removals, battle card, each with its own
//!   failure domain; one failure never blocks or rolls back another
//! - Per-deck re-entrancy guard: a duplicate reconcile/reload is refused
//!   without issuing a remote call
//! - Ledger gateway and session context are injected, never discovered

mod error;
mod events;
mod gate;
mod guard;
mod outcome;
mod service;
mod snapshot;

pub use error::{LoadError, SessionRefusal};
pub use events::{DeckHandler, DeckSelectionHandlers};
pub use gate::{ensure_approval, ApprovalDenial, ApprovalOutcome};
pub use outcome::{ReconcileOutcome, StepReport};
pub use service::{DeckService, DeckSummary};
pub use snapshot::DeckSnapshot;
