use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Player name must not be empty")]
    EmptyName,

    #[error("A player named '{0}' already exists")]
    DuplicateName(String),

    #[error("No player matches '{0}'")]
    UnknownPlayer(String),

    #[error("Player '{0}' is seated more than once")]
    DuplicateSeat(String),

    #[error("Expected {expected} players, got {actual}")]
    SeatCountMismatch { expected: usize, actual: usize },

    #[error("No game matches '{0}'")]
    UnknownGame(String),

    #[error("'{0}' matches more than one game; use more characters of the id")]
    AmbiguousGame(String),
}
