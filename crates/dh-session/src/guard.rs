//! Per-deck re-entrancy guard.
//!
//! A reconcile or reload for a deck must not start while a prior one for
//! the same deck is in flight; a duplicate request is refused without any
//! remote call being issued. The permit releases on drop, so an abandoned
//! operation (task cancelled, future dropped) frees its slot.

use std::collections::BTreeSet;
use std::sync::Mutex;

use dh_schemas::DeckId;

/// Key for one guarded operation slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum OpKey {
    Deck(DeckId),
    DeckList,
}

#[derive(Debug, Default)]
pub(crate) struct InFlightGuard {
    active: Mutex<BTreeSet<OpKey>>,
}

impl InFlightGuard {
    /// Claim the slot for `key`. Returns `None` if an operation holding the
    /// same key is still in flight.
    pub(crate) fn try_begin(&self, key: OpKey) -> Option<InFlightPermit<'_>> {
        // A poisoned lock still holds a consistent key set.
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if active.insert(key) {
            Some(InFlightPermit { guard: self, key })
        } else {
            None
        }
    }
}

/// Held for the duration of one guarded operation; releases the slot on drop.
#[derive(Debug)]
pub(crate) struct InFlightPermit<'a> {
    guard: &'a InFlightGuard,
    key: OpKey,
}

impl Drop for InFlightPermit<'_> {
    fn drop(&mut self) {
        let mut active = self
            .guard
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        active.remove(&self.key);
    }
}
