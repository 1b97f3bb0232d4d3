use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::settlement::GameMode;

/// Values above this for base/return point are treated as corrupted input.
pub const SETTINGS_POINT_LIMIT: i64 = 1_000_000;

const DEFAULT_BASE_POINT: i64 = 25000;
const DEFAULT_RETURN_POINT: i64 = 30000;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    /// Overrides the default ledger location (~/.config/janlog/ledger.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
}

/// Game rules as persisted in the config file.
///
/// Example YAML:
/// ```yaml
/// settings:
///   mode: 3-player
///   rank_bonus: [20, 0, -20]
///   exchange_rate: 50
///   base_point: 35000
///   return_point: 40000
///   table_fee: 500
///   use_conditional_bonus_3p: true
///   conditional_bonus_below_30k: [30, -10, -20]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub mode: GameMode,

    /// Bonus per finishing rank, 1st first
    pub rank_bonus: Vec<f64>,

    /// Currency units per 1000 points
    pub exchange_rate: f64,

    /// Starting score issued to each player
    pub base_point: i64,

    /// Score treated as zero when converting to result points
    pub return_point: i64,

    /// Fee in currency units charged to each game's winner
    pub table_fee: f64,

    /// 3-player only: pick the rank bonus by second place's score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_conditional_bonus_3p: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_bonus_below_30k: Option<Vec<f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_bonus_above_30k: Option<Vec<f64>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::FourPlayer,
            rank_bonus: vec![20.0, 10.0, -10.0, -20.0],
            exchange_rate: 50.0,
            base_point: DEFAULT_BASE_POINT,
            return_point: DEFAULT_RETURN_POINT,
            table_fee: 0.0,
            use_conditional_bonus_3p: None,
            conditional_bonus_below_30k: None,
            conditional_bonus_above_30k: None,
        }
    }
}

impl Settings {
    pub fn player_count(&self) -> usize {
        self.mode.player_count()
    }

    /// Reset base/return points that were saved with runaway values (for
    /// example two numbers typed into one field). Returns true if anything
    /// changed.
    pub fn sanitize(&mut self) -> bool {
        let mut repaired = false;
        if self.base_point > SETTINGS_POINT_LIMIT {
            tracing::warn!(
                base_point = self.base_point,
                "base point out of range, resetting to {}",
                DEFAULT_BASE_POINT
            );
            self.base_point = DEFAULT_BASE_POINT;
            repaired = true;
        }
        if self.return_point > SETTINGS_POINT_LIMIT {
            tracing::warn!(
                return_point = self.return_point,
                "return point out of range, resetting to {}",
                DEFAULT_RETURN_POINT
            );
            self.return_point = DEFAULT_RETURN_POINT;
            repaired = true;
        }
        repaired
    }
}
