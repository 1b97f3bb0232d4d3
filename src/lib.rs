//! Score tracking for 3- and 4-player tile-matching games.
//!
//! The core is [`settlement::calculate`], which turns raw end-of-game
//! scores into rank-adjusted result points. The remaining modules persist
//! settings, players and game history, and render them for the terminal.

pub mod config;
pub mod ledger;
pub mod output;
pub mod settlement;
