//! Typed deck-selection callbacks.
//!
//! The host registers handlers keyed by nothing more than the typed deck
//! id they will receive; after a confirmed selection it notifies the
//! registry. Plain function trait objects, multicast, no reflection and no
//! string-keyed wiring.

use dh_schemas::DeckId;

pub type DeckHandler = Box<dyn Fn(DeckId) + Send + Sync>;

/// Registry of deck-selection handlers.
#[derive(Default)]
pub struct DeckSelectionHandlers {
    on_edit: Vec<DeckHandler>,
    on_select: Vec<DeckHandler>,
}

impl DeckSelectionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler invoked when the player chooses to edit a deck.
    pub fn on_edit(&mut self, handler: impl Fn(DeckId) + Send + Sync + 'static) {
        self.on_edit.push(Box::new(handler));
    }

    /// Register a handler invoked when the player selects a deck to play.
    pub fn on_select(&mut self, handler: impl Fn(DeckId) + Send + Sync + 'static) {
        self.on_select.push(Box::new(handler));
    }

    /// Invoke every edit handler with the confirmed deck id.
    pub fn notify_edit(&self, deck: DeckId) {
        for handler in &self.on_edit {
            handler(deck);
        }
    }

    /// Invoke every select handler with the confirmed deck id.
    pub fn notify_select(&self, deck: DeckId) {
        for handler in &self.on_select {
            handler(deck);
        }
    }
}
