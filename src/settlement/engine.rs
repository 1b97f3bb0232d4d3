use super::error::SettlementError;
use super::rules::{RuleConfig, MIN_TOP_SCORE};

/// Outcome of settling one game.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// Result points by seat, in the same order as the raw scores.
    pub points: Vec<f64>,
    /// Table fee deducted from the winner, in points. Zero when no fee applies.
    pub fee_points: f64,
    /// Seats ordered from 1st to last.
    pub ranking: Vec<usize>,
}

impl Settlement {
    pub fn top_seat(&self) -> usize {
        self.ranking[0]
    }

    /// 0-based finishing rank of a seat.
    pub fn rank_of(&self, seat: usize) -> Option<usize> {
        self.ranking.iter().position(|&s| s == seat)
    }
}

/// Round a raw score to the nearest thousand, with a remainder of exactly 500
/// rounding down. `None` if rounding up leaves the `i64` range.
pub fn round_score(score: i64) -> Option<i64> {
    let remainder = score % 1000;
    let truncated = score - remainder;
    if remainder <= 500 {
        Some(truncated)
    } else {
        truncated.checked_add(1000)
    }
}

/// Seats ordered by descending score. Equal scores keep seat order, so the
/// earlier seat takes the higher rank.
pub fn rank_seats(scores: &[i64]) -> Vec<usize> {
    let mut seats: Vec<usize> = (0..scores.len()).collect();
    seats.sort_by(|&a, &b| scores[b].cmp(&scores[a]).then(a.cmp(&b)));
    seats
}

/// Settle raw end-of-game scores into result points.
///
/// Every non-winning seat receives `(rounded - return_point) / 1000` plus the
/// bonus for its rank. The winner receives the negation of everyone else's
/// total, minus the table fee, so the points sum to `-fee_points` up to f64
/// rounding.
pub fn calculate(scores: &[i64], rules: &RuleConfig) -> Result<Settlement, SettlementError> {
    if let Some((seat, &score)) = scores.iter().enumerate().find(|&(_, &s)| s < 0) {
        return Err(SettlementError::NegativeScore { seat, score });
    }

    let player_count = rules.player_count();
    if scores.len() != player_count {
        return Err(SettlementError::WrongPlayerCount {
            expected: player_count,
            actual: scores.len(),
        });
    }

    let expected = rules
        .expected_total()
        .ok_or(SettlementError::ScoreOverflow)?;
    let actual = scores
        .iter()
        .try_fold(0i64, |acc, &s| acc.checked_add(s))
        .ok_or(SettlementError::ScoreOverflow)?;
    if actual != expected {
        return Err(SettlementError::TotalMismatch {
            actual,
            expected,
            difference: actual
                .checked_sub(expected)
                .ok_or(SettlementError::ScoreOverflow)?,
        });
    }

    let top = scores.iter().copied().max().unwrap_or(0);
    if top < MIN_TOP_SCORE {
        return Err(SettlementError::TopScoreTooLow {
            top,
            minimum: MIN_TOP_SCORE,
        });
    }

    let ranking = rank_seats(scores);
    let raw_points = scores
        .iter()
        .map(|&s| {
            round_score(s)
                .and_then(|rounded| rounded.checked_sub(rules.return_point))
                .map(|diff| diff as f64 / 1000.0)
                .ok_or(SettlementError::ScoreOverflow)
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let bonus = rules.rank_bonus.select(scores[ranking[1]]);

    let mut points = vec![0.0; player_count];
    let mut others_total = 0.0;
    for (rank, &seat) in ranking.iter().enumerate().skip(1) {
        let p = raw_points[seat] + bonus.get(rank).copied().unwrap_or(0.0);
        points[seat] = p;
        others_total += p;
    }

    // Winner absorbs the residual; the configured 1st-place bonus is never added directly
    let fee_points = rules.fee_points();
    points[ranking[0]] = 0.0 - others_total - fee_points;

    Ok(Settlement {
        points,
        fee_points,
        ranking,
    })
}
