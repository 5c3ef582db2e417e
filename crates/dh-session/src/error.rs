use std::fmt;

use dh_ledger::LedgerError;
use dh_schemas::DeckId;

/// The reason a deck operation was refused before any remote call was made.
///
/// Implements `std::error::Error` so it can be boxed and propagated through
/// `Box<dyn Error>` chains without extra wrapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionRefusal {
    /// The session has no connected wallet.
    WalletDisconnected,
    /// The session is connected but no account is selected.
    NoAccount,
    /// A reconcile or reload for this deck is already in flight.
    DeckBusy(DeckId),
    /// A deck-list reload is already in flight.
    DeckListBusy,
}

impl fmt::Display for SessionRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRefusal::WalletDisconnected => {
                write!(f, "SESSION_REFUSED: wallet is not connected")
            }
            SessionRefusal::NoAccount => {
                write!(f, "SESSION_REFUSED: no account selected")
            }
            SessionRefusal::DeckBusy(deck) => {
                write!(f, "SESSION_REFUSED: an operation for {deck} is already in flight")
            }
            SessionRefusal::DeckListBusy => {
                write!(f, "SESSION_REFUSED: a deck-list reload is already in flight")
            }
        }
    }
}

impl std::error::Error for SessionRefusal {}

/// Failure of a read-only load operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    Refused(SessionRefusal),
    Ledger(LedgerError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Refused(refusal) => refusal.fmt(f),
            LoadError::Ledger(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Refused(refusal) => Some(refusal),
            LoadError::Ledger(err) => Some(err),
        }
    }
}

impl From<SessionRefusal> for LoadError {
    fn from(refusal: SessionRefusal) -> Self {
        LoadError::Refused(refusal)
    }
}

impl From<LedgerError> for LoadError {
    fn from(err: LedgerError) -> Self {
        LoadError::Ledger(err)
    }
}
