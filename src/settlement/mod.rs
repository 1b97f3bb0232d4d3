pub mod engine;
pub mod error;
pub mod rules;

pub use engine::{calculate, rank_seats, round_score, Settlement};
pub use error::SettlementError;
pub use rules::{
    GameMode, RankBonusPolicy, RuleConfig, CONDITIONAL_THRESHOLD, DEFAULT_BONUS_ABOVE,
    DEFAULT_BONUS_BELOW, MIN_TOP_SCORE,
};
