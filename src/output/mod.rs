pub mod formatter;

pub use formatter::{
    format_fee, format_history_table, format_history_tsv, format_players, format_points,
    format_settlement, format_standings, format_standings_tsv, format_total, ordinal,
    should_use_colors,
};
