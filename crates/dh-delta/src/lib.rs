//! dh-delta
//!
//! Minimal delta computation between a deck's mirrored state and the
//! player's edited selection.
//!
//! Architectural decisions:
//! - Support cards diff as a multiset: per-card count difference, split by
//!   sign into additions and removals
//! - Battle card diff as a plain value comparison (the slot holds one card)
//! - Order-independent and deterministic for a given pair of inputs
//!
//! Deterministic, pure logic. No IO. No ledger calls.

use std::collections::BTreeSet;

use dh_schemas::{CardId, SupportCards};
use serde::{Deserialize, Serialize};

/// The add/remove multiset pair produced by [`support_delta`].
///
/// Invariants (enforced by construction):
/// - no count is ever 0
/// - a card appears in at most one of the two sides
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportDelta {
    /// Cards to add, with the amount to add per card.
    pub to_add: SupportCards,
    /// Cards to remove, with the amount to remove per card.
    /// Amounts are positive; the ledger's remove call accepts no negatives.
    pub to_remove: SupportCards,
}

impl SupportDelta {
    /// `true` when no write is needed for the support multiset.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the minimal add/remove delta transforming `old` into `new`.
///
/// For every card in either mapping the count difference is taken; a
/// positive difference lands in `to_add`, a negative one (sign inverted)
/// in `to_remove`, and zero differences emit nothing. A card present in
/// `old` and absent from `new` is a full removal, and vice versa.
pub fn support_delta(old: &SupportCards, new: &SupportCards) -> SupportDelta {
    let mut cards: BTreeSet<CardId> = BTreeSet::new();
    cards.extend(old.keys().copied());
    cards.extend(new.keys().copied());

    let mut delta = SupportDelta::default();
    for card in cards {
        let before = i64::from(old.get(&card).copied().unwrap_or(0));
        let after = i64::from(new.get(&card).copied().unwrap_or(0));
        let diff = after - before;
        if diff > 0 {
            delta.to_add.insert(card, diff as u32);
        } else if diff < 0 {
            delta.to_remove.insert(card, (-diff) as u32);
        }
    }
    delta
}

/// The write (if any) needed to move the battle slot from `current` to the
/// desired card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleCardChange {
    /// Desired equals current; no write is issued.
    Unchanged,
    /// Occupy or replace the slot with this card.
    Set(CardId),
    /// Clear the slot (desired is the unset sentinel).
    Remove,
}

/// Battle-slot comparison. The slot holds a single card, so this is a value
/// comparison, not a multiset operation: unset -> set and set -> different
/// are both [`BattleCardChange::Set`]; set -> sentinel is a dedicated
/// remove write, never a "set to 0".
pub fn battle_card_change(current: CardId, desired: CardId) -> BattleCardChange {
    if desired == current {
        BattleCardChange::Unchanged
    } else if !desired.is_set() {
        BattleCardChange::Remove
    } else {
        BattleCardChange::Set(desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(pairs: &[(u64, u32)]) -> SupportCards {
        pairs
            .iter()
            .map(|(id, count)| (CardId::new(*id), *count))
            .collect()
    }

    #[test]
    fn worked_example_mixed_changes() {
        let old = cards(&[(1, 2), (2, 1)]);
        let new = cards(&[(1, 1), (3, 4)]);

        let delta = support_delta(&old, &new);
        assert_eq!(delta.to_add, cards(&[(3, 4)]));
        assert_eq!(delta.to_remove, cards(&[(1, 1), (2, 1)]));
    }

    #[test]
    fn worked_example_all_additions() {
        let delta = support_delta(&cards(&[]), &cards(&[(5, 3)]));
        assert_eq!(delta.to_add, cards(&[(5, 3)]));
        assert!(delta.to_remove.is_empty());
    }

    #[test]
    fn identical_mappings_yield_empty_delta() {
        let old = cards(&[(1, 2), (7, 5)]);
        let delta = support_delta(&old, &old.clone());
        assert!(delta.is_empty());
    }

    #[test]
    fn absent_key_is_a_full_removal() {
        let delta = support_delta(&cards(&[(4, 3)]), &cards(&[]));
        assert_eq!(delta.to_remove, cards(&[(4, 3)]));
        assert!(delta.to_add.is_empty());
    }

    #[test]
    fn zero_count_key_is_treated_as_absent() {
        // A selection surface should never hand us a 0 count, but if it
        // does the card must not leak into either side.
        let delta = support_delta(&cards(&[]), &cards(&[(9, 0)]));
        assert!(delta.is_empty());

        let delta = support_delta(&cards(&[(9, 0)]), &cards(&[]));
        assert!(delta.is_empty());
    }

    #[test]
    fn battle_card_value_comparison() {
        let a = CardId::new(11);
        let b = CardId::new(12);

        assert_eq!(battle_card_change(a, a), BattleCardChange::Unchanged);
        assert_eq!(battle_card_change(CardId::NONE, CardId::NONE), BattleCardChange::Unchanged);
        assert_eq!(battle_card_change(CardId::NONE, a), BattleCardChange::Set(a));
        assert_eq!(battle_card_change(a, b), BattleCardChange::Set(b));
        assert_eq!(battle_card_change(a, CardId::NONE), BattleCardChange::Remove);
    }
}
