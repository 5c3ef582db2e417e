//! Session-local mirror of one deck's ledger state.
//!
//! A snapshot is created by [`crate::DeckService::load_deck`] at the start
//! of an edit session and discarded when the session ends; the ledger is
//! the durable store. Mutators are `pub(crate)`: only the reconciliation
//! coordinator may touch the mirror, and only after a success receipt for
//! the corresponding write.

use dh_schemas::{CardId, DeckId, SupportCardEntry, SupportCards};
use serde::Serialize;

/// Local mirror of one deck. Owned exclusively by its edit session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeckSnapshot {
    deck_id: DeckId,
    battle_card: CardId,
    support_cards: SupportCards,
}

impl DeckSnapshot {
    /// Build a snapshot from freshly loaded ledger state. Zero counts are
    /// dropped so the stored multiset keeps its invariant.
    pub(crate) fn new(deck_id: DeckId, battle_card: CardId, support_cards: SupportCards) -> Self {
        Self {
            deck_id,
            battle_card,
            support_cards: support_cards
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .collect(),
        }
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    /// The mirrored battle slot; the sentinel when unset.
    pub fn battle_card(&self) -> CardId {
        self.battle_card
    }

    pub fn support_cards(&self) -> &SupportCards {
        &self.support_cards
    }

    /// Mirrored count for one card; 0 when absent.
    pub fn support_count(&self, card: CardId) -> u32 {
        self.support_cards.get(&card).copied().unwrap_or(0)
    }

    /// Total number of support cards across all kinds.
    pub fn support_total(&self) -> u32 {
        self.support_cards.values().sum()
    }

    /// Merge confirmed additions: increment existing counts, insert new keys.
    pub(crate) fn apply_additions(&mut self, entries: &[SupportCardEntry]) {
        for entry in entries {
            *self.support_cards.entry(entry.card).or_insert(0) += entry.count;
        }
    }

    /// Apply confirmed removals: a decrement reaching exactly 0 deletes the
    /// key. A removal larger than the mirrored count leaves the entry
    /// untouched; the ledger rejects such a call before it is confirmed, so
    /// this arm only defends the mirror's no-nonpositive-count invariant.
    pub(crate) fn apply_removals(&mut self, entries: &[SupportCardEntry]) {
        for entry in entries {
            match self.support_cards.get_mut(&entry.card) {
                Some(count) if *count == entry.count => {
                    self.support_cards.remove(&entry.card);
                }
                Some(count) if *count > entry.count => {
                    *count -= entry.count;
                }
                _ => {}
            }
        }
    }

    /// Record a confirmed battle-slot write.
    pub(crate) fn set_battle_card(&mut self, card: CardId) {
        self.battle_card = card;
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

    fn entries(pairs: &[(u64, u32)]) -> Vec<SupportCardEntry> {
        pairs
            .iter()
            .map(|(id, count)| SupportCardEntry::new(CardId::new(*id), *count))
            .collect()
    }

    #[test]
    fn construction_drops_zero_counts() {
        let snap = DeckSnapshot::new(DeckId::new(1), CardId::NONE, cards(&[(1, 2), (2, 0)]));
        assert_eq!(snap.support_cards(), &cards(&[(1, 2)]));
    }

    #[test]
    fn additions_merge_into_existing_counts() {
        let mut snap = DeckSnapshot::new(DeckId::new(1), CardId::NONE, cards(&[(1, 2)]));
        snap.apply_additions(&entries(&[(1, 1), (3, 4)]));
        assert_eq!(snap.support_cards(), &cards(&[(1, 3), (3, 4)]));
    }

    #[test]
    fn removal_reaching_zero_deletes_the_key() {
        let mut snap = DeckSnapshot::new(DeckId::new(1), CardId::NONE, cards(&[(1, 2), (2, 1)]));
        snap.apply_removals(&entries(&[(1, 1), (2, 1)]));
        assert_eq!(snap.support_cards(), &cards(&[(1, 1)]));
    }

    #[test]
    fn oversized_removal_leaves_entry_untouched() {
        let mut snap = DeckSnapshot::new(DeckId::new(1), CardId::NONE, cards(&[(1, 2)]));
        snap.apply_removals(&entries(&[(1, 5), (9, 1)]));
        assert_eq!(snap.support_cards(), &cards(&[(1, 2)]));
    }

    #[test]
    fn support_total_sums_all_kinds() {
        let snap = DeckSnapshot::new(DeckId::new(1), CardId::new(7), cards(&[(1, 2), (2, 3)]));
        assert_eq!(snap.support_total(), 5);
        assert_eq!(snap.support_count(CardId::new(2)), 3);
        assert_eq!(snap.support_count(CardId::new(9)), 0);
    }
}
