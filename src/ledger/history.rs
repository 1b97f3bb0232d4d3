use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::types::{GameRecord, Ledger};

/// Running totals for one registered player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTotal {
    pub player_id: String,
    pub name: String,
    pub games: usize,
    pub total_points: f64,
}

/// Group results by UTC calendar date. Dates are newest first; games within
/// a date are oldest first so they read as game 1, 2, 3...
pub fn group_by_date(results: &[GameRecord]) -> Vec<(NaiveDate, Vec<&GameRecord>)> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&GameRecord>> = BTreeMap::new();
    for record in results {
        by_date
            .entry(record.date.date_naive())
            .or_default()
            .push(record);
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, mut records)| {
            records.sort_by_key(|r| r.date);
            (date, records)
        })
        .collect()
}

/// Games played on one date, oldest first
pub fn results_on(results: &[GameRecord], date: NaiveDate) -> Vec<&GameRecord> {
    let mut records: Vec<&GameRecord> = results
        .iter()
        .filter(|r| r.date.date_naive() == date)
        .collect();
    records.sort_by_key(|r| r.date);
    records
}

/// Player ids seated in any of the records, in order of first appearance
pub fn participants<'a>(records: &[&'a GameRecord]) -> Vec<&'a str> {
    let mut ids: Vec<&'a str> = Vec::new();
    for record in records {
        for id in &record.players {
            if !ids.contains(&id.as_str()) {
                ids.push(id.as_str());
            }
        }
    }
    ids
}

/// Sum of one player's points across the records
pub fn seat_total(records: &[&GameRecord], player_id: &str) -> f64 {
    records
        .iter()
        .filter_map(|r| r.points_for(player_id))
        .sum()
}

/// Sum of fee points across the records
pub fn fee_total(records: &[&GameRecord]) -> f64 {
    records.iter().map(|r| r.effective_fee_points()).sum()
}

/// Games and total points for every registered player, highest total first.
/// Players with equal totals keep roster order.
pub fn player_totals(ledger: &Ledger) -> Vec<PlayerTotal> {
    let mut totals: Vec<PlayerTotal> = ledger
        .players
        .iter()
        .map(|player| {
            let games: Vec<&GameRecord> = ledger
                .results
                .iter()
                .filter(|r| r.seat_of(&player.id).is_some())
                .collect();
            PlayerTotal {
                player_id: player.id.clone(),
                name: player.name.clone(),
                games: games.len(),
                total_points: seat_total(&games, &player.id),
            }
        })
        .collect();

    totals.sort_by(|a, b| {
        b.total_points
            .partial_cmp(&a.total_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    totals
}
