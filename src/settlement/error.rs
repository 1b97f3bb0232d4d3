use thiserror::Error;

/// Reasons a set of raw scores cannot be settled.
///
/// Checks run in declaration order and the first failure is returned.
/// `ScoreOverflow` can surface at any arithmetic step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Seat {} has a negative score ({score})", .seat + 1)]
    NegativeScore { seat: usize, score: i64 },

    #[error("Wrong number of players: expected {expected}, got {actual}")]
    WrongPlayerCount { expected: usize, actual: usize },

    #[error("Score total does not match (current: {actual}, expected: {expected}, difference: {difference})")]
    TotalMismatch {
        actual: i64,
        expected: i64,
        difference: i64,
    },

    #[error("Top score is below {minimum} ({top})")]
    TopScoreTooLow { top: i64, minimum: i64 },

    #[error("Scores are too large to settle")]
    ScoreOverflow,
}
