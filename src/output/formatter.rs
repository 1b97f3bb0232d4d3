use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::ledger::{fee_total, participants, seat_total, GameRecord, Ledger, PlayerTotal};
use crate::settlement::Settlement;

/// Narrowest a player column may get before names stop being readable
const MIN_NAME_WIDTH: usize = 4;
/// Wide enough for "-100.5"
const POINTS_WIDTH: usize = 7;
const SEPARATOR: &str = "  ";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Format result points with an explicit sign: "+55", "-25", "+10.5", "0"
pub fn format_points(points: f64) -> String {
    if points == 0.0 {
        "0".to_string()
    } else if points.fract() == 0.0 {
        format!("{:+}", points as i64)
    } else {
        format!("{:+.1}", points)
    }
}

/// Format an accumulated total with one decimal: "+25.0", "-50.0", "0.0"
pub fn format_total(points: f64) -> String {
    if points > 0.0 {
        format!("+{:.1}", points)
    } else if points < 0.0 {
        format!("{:.1}", points)
    } else {
        "0.0".to_string()
    }
}

/// Fee column for one game. Older records without stored fee points show
/// `table_fee / 100`, and "-" when there was no fee at all.
pub fn format_fee(record: &GameRecord) -> String {
    match record.fee_points {
        Some(fee) => format!("{:.1}", fee),
        None if record.table_fee > 0.0 => format!("{:.1}", record.table_fee / 100.0),
        None => "-".to_string(),
    }
}

/// "1st", "2nd", "3rd", "4th" from a 0-based rank
pub fn ordinal(rank: usize) -> String {
    let n = rank + 1;
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Green for positive, red for negative
fn paint(text: &str, value: f64, use_colors: bool) -> String {
    if !use_colors {
        text.to_string()
    } else if value > 0.0 {
        text.green().to_string()
    } else if value < 0.0 {
        text.red().to_string()
    } else {
        text.to_string()
    }
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format one settled game, one line per seat in seat order
///
/// Columns: seat, name, raw score, finishing rank, result points.
/// A fee line follows when the winner paid a table fee.
pub fn format_settlement(
    names: &[&str],
    scores: &[i64],
    settlement: &Settlement,
    use_colors: bool,
) -> String {
    let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);

    let mut lines: Vec<String> = scores
        .iter()
        .enumerate()
        .map(|(seat, score)| {
            let name = names.get(seat).copied().unwrap_or("");
            let rank = settlement
                .rank_of(seat)
                .map(ordinal)
                .unwrap_or_default();
            let points = settlement.points.get(seat).copied().unwrap_or(0.0);
            let points_str = format!("{:>width$}", format_points(points), width = POINTS_WIDTH);
            let seat_str = format!("{:>2}.", seat + 1);

            let line = format!(
                "{} {:<name_width$}{}{:>6}{}{:>3}{}{}",
                if use_colors { seat_str.dimmed().to_string() } else { seat_str },
                name,
                SEPARATOR,
                score,
                SEPARATOR,
                rank,
                SEPARATOR,
                paint(&points_str, points, use_colors),
                name_width = name_width,
            );
            line.trim_end().to_string()
        })
        .collect();

    if settlement.fee_points > 0.0 {
        let payer = names.get(settlement.top_seat()).copied().unwrap_or("");
        lines.push(format!(
            "Table fee: {} pts (paid by {})",
            format_points(settlement.fee_points).trim_start_matches('+'),
            payer
        ));
    }

    lines.join("\n")
}

/// Format one day's games as a table: game number, time, id, one column per
/// player, fee. A total row closes the table.
pub fn format_history_table(
    title: &str,
    records: &[&GameRecord],
    ledger: &Ledger,
    use_colors: bool,
) -> String {
    render_history_table(title, records, ledger, use_colors, get_terminal_width())
}

fn render_history_table(
    title: &str,
    records: &[&GameRecord],
    ledger: &Ledger,
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    let heading = if use_colors {
        title.bold().to_string()
    } else {
        title.to_string()
    };

    if records.is_empty() {
        return format!("{}\nNo games recorded.", heading);
    }

    let ids = participants(records);
    let names: Vec<&str> = ids.iter().map(|id| ledger.player_name(id)).collect();

    // "#" (3) + time (5) + id (8) + fee (6), each followed by a separator
    let fixed_width = 3 + 5 + 8 + 6 + SEPARATOR.len() * 4;
    let mut col_width = names
        .iter()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .max(POINTS_WIDTH);
    if let Some(width) = term_width {
        // A day whose records have no seats has no player columns to size
        if width > fixed_width && !ids.is_empty() {
            let available = (width - fixed_width) / ids.len();
            col_width = col_width.min(available.saturating_sub(SEPARATOR.len()).max(MIN_NAME_WIDTH));
        }
    }

    let mut lines = vec![heading];

    let player_header: Vec<String> = names
        .iter()
        .map(|n| format!("{:>width$}", truncate_name(n, col_width), width = col_width))
        .collect();
    let header = format!(
        "{:>3}{}{:<5}{}{:<8}{}{}{}{:>6}",
        "#",
        SEPARATOR,
        "Time",
        SEPARATOR,
        "ID",
        SEPARATOR,
        player_header.join(SEPARATOR),
        SEPARATOR,
        "Fee"
    );
    lines.push(if use_colors { header.dimmed().to_string() } else { header });

    for (idx, record) in records.iter().enumerate() {
        let cells: Vec<String> = ids
            .iter()
            .map(|id| match record.points_for(id) {
                Some(points) => {
                    let cell = format!("{:>width$}", format_points(points), width = col_width);
                    paint(&cell, points, use_colors)
                }
                None => format!("{:>width$}", "-", width = col_width),
            })
            .collect();

        lines.push(format!(
            "{:>3}{}{}{}{:<8}{}{}{}{:>6}",
            idx + 1,
            SEPARATOR,
            record.date.format("%H:%M"),
            SEPARATOR,
            record.short_id(),
            SEPARATOR,
            cells.join(SEPARATOR),
            SEPARATOR,
            format_fee(record)
        ));
    }

    let totals: Vec<String> = ids
        .iter()
        .map(|id| {
            let total = seat_total(records, id);
            let cell = format!("{:>width$}", format_total(total), width = col_width);
            paint(&cell, total, use_colors)
        })
        .collect();
    let fees = fee_total(records);
    let fee_str = if fees > 0.0 {
        format!("{:.1}", fees)
    } else {
        "-".to_string()
    };
    let total_line = format!(
        "{:<width$}{}{}{}{:>6}",
        "Total",
        SEPARATOR,
        totals.join(SEPARATOR),
        SEPARATOR,
        fee_str,
        width = 3 + SEPARATOR.len() + 5 + SEPARATOR.len() + 8,
    );
    lines.push(if use_colors { total_line.bold().to_string() } else { total_line });

    lines.join("\n")
}

/// Format games as tab-separated values for scripting
/// One line per seat: date, game id, player, raw score, points (no headers, no colors)
pub fn format_history_tsv(records: &[&GameRecord], ledger: &Ledger) -> String {
    records
        .iter()
        .flat_map(|record| {
            record.players.iter().enumerate().map(move |(seat, id)| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    record.date.to_rfc3339(),
                    record.id,
                    ledger.player_name(id),
                    record.scores.get(seat).copied().unwrap_or_default(),
                    record.points.get(seat).copied().unwrap_or_default()
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format overall standings, highest total first
pub fn format_standings(totals: &[PlayerTotal], use_colors: bool) -> String {
    if totals.is_empty() {
        return "No players registered.".to_string();
    }

    let name_width = totals
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0);

    totals
        .iter()
        .enumerate()
        .map(|(idx, total)| {
            let index_str = format!("{:>2}.", idx + 1);
            let games = if total.games == 1 {
                "1 game".to_string()
            } else {
                format!("{} games", total.games)
            };
            let points = format!("{:>8}", format_total(total.total_points));
            format!(
                "{} {:<name_width$}{}{:>9}{}{}",
                if use_colors { index_str.dimmed().to_string() } else { index_str },
                total.name,
                SEPARATOR,
                games,
                SEPARATOR,
                paint(&points, total.total_points, use_colors),
                name_width = name_width,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as tab-separated values: name, games, total points
pub fn format_standings_tsv(totals: &[PlayerTotal]) -> String {
    totals
        .iter()
        .map(|t| format!("{}\t{}\t{:.1}", t.name, t.games, t.total_points))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the player roster, one per line with the id prefix
pub fn format_players(ledger: &Ledger) -> String {
    if ledger.players.is_empty() {
        return "No players registered.".to_string();
    }

    ledger
        .players
        .iter()
        .map(|p| {
            let short: String = p.id.chars().take(8).collect();
            format!("{}  {}", short, p.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Player;
    use chrono::{TimeZone, Utc};

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        for (id, name) in [
            ("p1", "Alice"),
            ("p2", "Bob"),
            ("p3", "Carol"),
            ("p4", "Dave"),
        ] {
            ledger.players.push(Player {
                id: id.to_string(),
                name: name.to_string(),
            });
        }
        ledger.results = vec![
            GameRecord {
                id: "aaaaaaaa-0000".to_string(),
                date: Utc.with_ymd_and_hms(2026, 5, 1, 18, 5, 0).unwrap(),
                players: vec!["p1".into(), "p2".into(), "p3".into(), "p4".into()],
                scores: vec![45000, 30000, 15000, 10000],
                points: vec![45.0, 10.0, -25.0, -40.0],
                table_fee: 500.0,
                fee_points: Some(10.0),
            },
            GameRecord {
                id: "bbbbbbbb-0000".to_string(),
                date: Utc.with_ymd_and_hms(2026, 5, 1, 19, 40, 0).unwrap(),
                players: vec!["p2".into(), "p1".into(), "p3".into(), "p4".into()],
                scores: vec![41000, 29500, 20500, 9000],
                points: vec![52.5, 9.5, -20.5, -41.5],
                table_fee: 0.0,
                fee_points: None,
            },
        ];
        ledger
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(55.0), "+55");
        assert_eq!(format_points(-25.0), "-25");
        assert_eq!(format_points(10.5), "+10.5");
        assert_eq!(format_points(-0.5), "-0.5");
        assert_eq!(format_points(0.0), "0");
        assert_eq!(format_points(-0.0), "0");
    }

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(25.0), "+25.0");
        assert_eq!(format_total(-50.24), "-50.2");
        assert_eq!(format_total(0.0), "0.0");
    }

    #[test]
    fn test_format_fee() {
        let ledger = sample_ledger();
        assert_eq!(format_fee(&ledger.results[0]), "10.0");
        assert_eq!(format_fee(&ledger.results[1]), "-");

        let mut legacy = ledger.results[1].clone();
        legacy.table_fee = 600.0;
        assert_eq!(format_fee(&legacy), "6.0");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(0), "1st");
        assert_eq!(ordinal(1), "2nd");
        assert_eq!(ordinal(2), "3rd");
        assert_eq!(ordinal(3), "4th");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Alice", 10), "Alice");
        assert_eq!(truncate_name("Bartholomew", 8), "Barth...");
        assert_eq!(truncate_name("Bartholomew", 3), "Bar");
    }

    #[test]
    fn test_format_settlement() {
        let settlement = Settlement {
            points: vec![-25.0, 45.0, 10.0, -40.0],
            fee_points: 10.0,
            ranking: vec![1, 2, 0, 3],
        };
        let result = format_settlement(
            &["Carol", "Alice", "Bob", "Dave"],
            &[15000, 45000, 30000, 10000],
            &settlement,
            false,
        );
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with(" 1. Carol"));
        assert!(lines[0].contains("15000"));
        assert!(lines[0].contains("3rd"));
        assert!(lines[0].ends_with("-25"));
        assert!(lines[1].contains("1st"));
        assert!(lines[1].ends_with("+45"));
        assert_eq!(lines[4], "Table fee: 10 pts (paid by Alice)");
    }

    #[test]
    fn test_format_settlement_without_fee() {
        let settlement = Settlement {
            points: vec![55.0, 10.0, -25.0, -40.0],
            fee_points: 0.0,
            ranking: vec![0, 1, 2, 3],
        };
        let result = format_settlement(
            &["Alice", "Bob", "Carol", "Dave"],
            &[45000, 30000, 15000, 10000],
            &settlement,
            false,
        );
        assert_eq!(result.lines().count(), 4);
        assert!(!result.contains("Table fee"));
    }

    #[test]
    fn test_history_table_layout() {
        let ledger = sample_ledger();
        let records: Vec<&GameRecord> = ledger.results.iter().collect();
        let result = render_history_table("2026-05-01", &records, &ledger, false, None);
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "2026-05-01");
        assert!(lines[1].contains("Alice"));
        assert!(lines[1].ends_with("Fee"));
        assert!(lines[2].starts_with("  1  18:05  aaaaaaaa"));
        assert!(lines[2].ends_with("10.0"));
        assert!(lines[3].contains("+52.5"));
        assert!(lines[3].ends_with("-"));
        assert!(lines[4].starts_with("Total"));
        // Alice: 45 + 9.5, Bob: 10 + 52.5
        assert!(lines[4].contains("+54.5"));
        assert!(lines[4].contains("+62.5"));
        assert!(lines[4].ends_with("10.0"));
    }

    #[test]
    fn test_history_table_column_order_follows_first_game() {
        let ledger = sample_ledger();
        let records: Vec<&GameRecord> = ledger.results.iter().collect();
        let result = render_history_table("t", &records, &ledger, false, None);
        let header = result.lines().nth(1).unwrap();
        let alice = header.find("Alice").unwrap();
        let bob = header.find("Bob").unwrap();
        assert!(alice < bob);
    }

    #[test]
    fn test_history_table_narrow_terminal_truncates() {
        let mut ledger = sample_ledger();
        ledger.players[0].name = "Alexandria Ocasio".to_string();
        let records: Vec<&GameRecord> = ledger.results.iter().collect();
        let result = render_history_table("t", &records, &ledger, false, Some(60));
        assert!(!result.contains("Alexandria Ocasio"));
        assert!(result.contains("..."));
    }

    #[test]
    fn test_history_table_seatless_record_on_terminal() {
        let ledger = sample_ledger();
        let mut seatless = ledger.results[0].clone();
        seatless.id = "cccccccc-0000".to_string();
        seatless.players.clear();
        seatless.scores.clear();
        seatless.points.clear();
        let records = vec![&seatless];
        let result = render_history_table("t", &records, &ledger, false, Some(80));
        assert!(result.contains("cccccccc"));
    }

    #[test]
    fn test_history_table_empty() {
        let ledger = Ledger::new();
        let result = render_history_table("2026-05-01", &[], &ledger, false, None);
        assert_eq!(result, "2026-05-01\nNo games recorded.");
    }

    #[test]
    fn test_history_table_removed_player_shows_id() {
        let mut ledger = sample_ledger();
        ledger.players.retain(|p| p.id != "p4");
        let records: Vec<&GameRecord> = ledger.results.iter().collect();
        let result = render_history_table("t", &records, &ledger, false, None);
        assert!(result.lines().nth(1).unwrap().contains("p4"));
    }

    #[test]
    fn test_format_history_tsv() {
        let ledger = sample_ledger();
        let records: Vec<&GameRecord> = ledger.results.iter().collect();
        let result = format_history_tsv(&records, &ledger);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0].split('\t').count(), 5);
        assert!(lines[0].ends_with("\tAlice\t45000\t45"));
        assert!(lines[4].ends_with("\tBob\t41000\t52.5"));
    }

    #[test]
    fn test_format_history_tsv_empty() {
        let ledger = Ledger::new();
        assert_eq!(format_history_tsv(&[], &ledger), "");
    }

    #[test]
    fn test_format_standings() {
        let totals = vec![
            PlayerTotal {
                player_id: "p2".into(),
                name: "Bob".into(),
                games: 2,
                total_points: 62.5,
            },
            PlayerTotal {
                player_id: "p4".into(),
                name: "Dave".into(),
                games: 1,
                total_points: -40.0,
            },
        ];
        let result = format_standings(&totals, false);
        let lines: Vec<&str> = result.lines().collect();
        assert!(lines[0].starts_with(" 1. Bob"));
        assert!(lines[0].contains("2 games"));
        assert!(lines[0].ends_with("+62.5"));
        assert!(lines[1].contains("1 game"));
        assert!(lines[1].ends_with("-40.0"));

        assert_eq!(
            format_standings_tsv(&totals),
            "Bob\t2\t62.5\nDave\t1\t-40.0"
        );
    }

    #[test]
    fn test_format_standings_empty() {
        assert_eq!(format_standings(&[], false), "No players registered.");
    }

    #[test]
    fn test_format_players() {
        let ledger = sample_ledger();
        let result = format_players(&ledger);
        assert_eq!(result.lines().next(), Some("p1  Alice"));
        assert_eq!(format_players(&Ledger::new()), "No players registered.");
    }
}
