//! Shared identifier and session types used across the deckhand crates.
//!
//! Everything here is plain data: construction helpers and validation only,
//! no IO and no ledger calls.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque card-type identifier assigned by the ledger.
///
/// The raw value `0` is reserved: it means "no battle card" and is never a
/// valid card id in any slot. Use [`CardId::NONE`] rather than a literal zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl CardId {
    /// The "no battle card" sentinel.
    pub const NONE: CardId = CardId(0);

    pub fn new(raw: u64) -> Self {
        CardId(raw)
    }

    /// `true` for any id other than the unset sentinel.
    pub fn is_set(&self) -> bool {
        self.0 != 0
    }
}

impl Default for CardId {
    /// The unset sentinel.
    fn default() -> Self {
        CardId::NONE
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "card#{}", self.0)
        } else {
            write!(f, "card#none")
        }
    }
}

/// Identifies one deck on the remote ledger. Immutable for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(pub u64);

impl DeckId {
    pub fn new(raw: u64) -> Self {
        DeckId(raw)
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deck#{}", self.0)
    }
}

/// Support-card mapping: card id -> positive count.
///
/// A key with count 0 must never be stored; remove the key instead.
pub type SupportCards = BTreeMap<CardId, u32>;

/// One `(card, count)` pair as submitted to the ledger's multiset operations.
/// Counts are always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportCardEntry {
    pub card: CardId,
    pub count: u32,
}

impl SupportCardEntry {
    pub fn new(card: CardId, count: u32) -> Self {
        Self { card, count }
    }
}

/// Flatten a support-card mapping into the entry list shape the ledger's
/// multiset operations accept. BTreeMap iteration keeps the output stable.
pub fn support_entries(cards: &SupportCards) -> Vec<SupportCardEntry> {
    cards
        .iter()
        .map(|(card, count)| SupportCardEntry::new(*card, *count))
        .collect()
}

/// Account identifier as provided by the wallet/session provider.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(pub String);

impl AccountAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        AccountAddress(raw.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session state threaded explicitly into every deck operation.
///
/// Replaces any process-wide "currently selected account" singleton: the
/// wallet provider constructs one of these after account selection and the
/// host passes it to `dh-session` calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub account: AccountAddress,
    pub connected: bool,
}

impl SessionContext {
    /// A connected session for the given account.
    pub fn connected(account: AccountAddress) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            account,
            connected: true,
        }
    }

    /// A session with no wallet attached. Deck operations refuse it.
    pub fn disconnected() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            account: AccountAddress::new(""),
            connected: false,
        }
    }

    /// `true` when the session is connected and an account is selected.
    pub fn has_account(&self) -> bool {
        self.connected && !self.account.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_id_sentinel_is_unset() {
        assert!(!CardId::NONE.is_set());
        assert!(CardId::new(7).is_set());
    }

    #[test]
    fn support_entries_are_stable_and_ordered() {
        let mut cards = SupportCards::new();
        cards.insert(CardId::new(9), 1);
        cards.insert(CardId::new(3), 4);

        let entries = support_entries(&cards);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], SupportCardEntry::new(CardId::new(3), 4));
        assert_eq!(entries[1], SupportCardEntry::new(CardId::new(9), 1));
    }

    #[test]
    fn disconnected_session_has_no_account() {
        assert!(!SessionContext::disconnected().has_account());
        assert!(SessionContext::connected(AccountAddress::new("0xabc")).has_account());
    }
}
