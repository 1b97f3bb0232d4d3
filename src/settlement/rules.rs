use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Settings;

/// Lowest score the winner must reach for a game to be settled.
pub const MIN_TOP_SCORE: i64 = 40_000;

/// Second-place score that switches the 3-player conditional schedule.
pub const CONDITIONAL_THRESHOLD: i64 = 30_000;

/// Fallback 3-player schedule when second place finished below the threshold.
pub const DEFAULT_BONUS_BELOW: [f64; 3] = [30.0, -10.0, -20.0];

/// Fallback 3-player schedule when second place finished at or above the threshold.
pub const DEFAULT_BONUS_ABOVE: [f64; 3] = [20.0, 10.0, -30.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum GameMode {
    #[serde(rename = "4-player")]
    FourPlayer,
    #[serde(rename = "3-player")]
    ThreePlayer,
}

impl GameMode {
    pub fn player_count(self) -> usize {
        match self {
            GameMode::FourPlayer => 4,
            GameMode::ThreePlayer => 3,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4" | "4-player" | "4p" => Some(GameMode::FourPlayer),
            "3" | "3-player" | "3p" => Some(GameMode::ThreePlayer),
            _ => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::FourPlayer => write!(f, "4-player"),
            GameMode::ThreePlayer => write!(f, "3-player"),
        }
    }
}

/// Rank bonus (uma) schedule, indexed by finishing rank, 1st first.
///
/// `Conditional` picks between two schedules by looking at the raw score of
/// the player who finished second: below `threshold` selects `below`,
/// anything else selects `above`.
#[derive(Debug, Clone, PartialEq)]
pub enum RankBonusPolicy {
    Fixed(Vec<f64>),
    Conditional {
        below: Vec<f64>,
        above: Vec<f64>,
        threshold: i64,
    },
}

impl RankBonusPolicy {
    /// Conditional schedule at the standard threshold, filling in the
    /// fallback sequences for anything not configured.
    pub fn conditional(below: Option<Vec<f64>>, above: Option<Vec<f64>>) -> Self {
        RankBonusPolicy::Conditional {
            below: below.unwrap_or_else(|| DEFAULT_BONUS_BELOW.to_vec()),
            above: above.unwrap_or_else(|| DEFAULT_BONUS_ABOVE.to_vec()),
            threshold: CONDITIONAL_THRESHOLD,
        }
    }

    pub fn select(&self, second_place_score: i64) -> &[f64] {
        match self {
            RankBonusPolicy::Fixed(bonus) => bonus,
            RankBonusPolicy::Conditional {
                below,
                above,
                threshold,
            } => {
                if second_place_score < *threshold {
                    below
                } else {
                    above
                }
            }
        }
    }
}

/// Everything the settlement calculator needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    pub mode: GameMode,
    pub base_point: i64,
    pub return_point: i64,
    pub rank_bonus: RankBonusPolicy,
    /// Flat fee in currency units, paid by the winner.
    pub table_fee: f64,
    /// Currency units per 1000 raw-score units.
    pub exchange_rate: f64,
}

impl RuleConfig {
    pub fn player_count(&self) -> usize {
        self.mode.player_count()
    }

    /// Sum every valid score set must reach. `None` if it overflows `i64`.
    pub fn expected_total(&self) -> Option<i64> {
        self.base_point.checked_mul(self.player_count() as i64)
    }

    /// Table fee expressed in result points. Zero unless both the fee and the
    /// exchange rate are positive.
    pub fn fee_points(&self) -> f64 {
        if self.table_fee > 0.0 && self.exchange_rate > 0.0 {
            self.table_fee / self.exchange_rate
        } else {
            0.0
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let rank_bonus = match settings.mode {
            GameMode::ThreePlayer if settings.use_conditional_bonus_3p.unwrap_or(false) => {
                RankBonusPolicy::conditional(
                    settings.conditional_bonus_below_30k.clone(),
                    settings.conditional_bonus_above_30k.clone(),
                )
            }
            _ => RankBonusPolicy::Fixed(settings.rank_bonus.clone()),
        };

        Self {
            mode: settings.mode,
            base_point: settings.base_point,
            return_point: settings.return_point,
            rank_bonus,
            table_fee: settings.table_fee,
            exchange_rate: settings.exchange_rate,
        }
    }
}

impl From<&Settings> for RuleConfig {
    fn from(settings: &Settings) -> Self {
        RuleConfig::from_settings(settings)
    }
}
