use chrono::{NaiveDate, TimeZone, Utc};
use std::fs;
use tempfile::TempDir;

use janlog::config::{load_config, validate_settings};
use janlog::ledger::{self, Ledger, LedgerError};
use janlog::settlement::{calculate, GameMode, RankBonusPolicy, RuleConfig, SettlementError};

const THREE_PLAYER_CONFIG: &str = r#"
settings:
  mode: 3-player
  rank_bonus: [20, 0, -20]
  exchange_rate: 50
  base_point: 35000
  return_point: 40000
  table_fee: 500
  use_conditional_bonus_3p: true
"#;

fn three_player_rules(dir: &TempDir) -> RuleConfig {
    let path = dir.path().join("config.yaml");
    fs::write(&path, THREE_PLAYER_CONFIG).unwrap();
    let config = load_config(Some(path)).unwrap();
    validate_settings(&config.settings).unwrap();
    RuleConfig::from_settings(&config.settings)
}

fn seats(ledger: &Ledger, names: &[&str]) -> Vec<String> {
    let keys: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    ledger.resolve_seats(&keys, names.len()).unwrap()
}

#[test]
fn test_config_file_drives_conditional_settlement() {
    let dir = TempDir::new().unwrap();
    let rules = three_player_rules(&dir);

    assert_eq!(rules.mode, GameMode::ThreePlayer);
    assert_eq!(rules.expected_total(), Some(105_000));
    assert_eq!(rules.fee_points(), 10.0);
    assert!(matches!(rules.rank_bonus, RankBonusPolicy::Conditional { .. }));

    // Second place at 35000 uses the upper schedule
    let above = calculate(&[50_000, 35_000, 20_000], &rules).unwrap();
    assert_eq!(above.points, vec![35.0, 5.0, -50.0]);

    // Second place at 25000 uses the lower schedule
    let below = calculate(&[60_000, 25_000, 20_000], &rules).unwrap();
    assert_eq!(below.points, vec![55.0, -25.0, -40.0]);
    assert!((below.points.iter().sum::<f64>() + below.fee_points).abs() < 1e-9);
}

#[test]
fn test_record_save_reload_and_standings() {
    let dir = TempDir::new().unwrap();
    let rules = three_player_rules(&dir);
    let ledger_path = dir.path().join("ledger.json");

    let mut ledger = ledger::load_ledger(&ledger_path).unwrap();
    assert!(ledger.results.is_empty());
    for name in ["Alice", "Bob", "Carol"] {
        ledger.add_player(name).unwrap();
    }

    let first_scores = vec![50_000, 35_000, 20_000];
    let first = calculate(&first_scores, &rules).unwrap();
    let first_at = Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap();
    let first_seats = seats(&ledger, &["Alice", "Bob", "Carol"]);
    ledger.record_game(first_seats, first_scores, &first, rules.table_fee, first_at);

    let second_scores = vec![45_000, 28_000, 32_000];
    let second = calculate(&second_scores, &rules).unwrap();
    assert_eq!(second.points, vec![30.0, -42.0, 2.0]);
    let second_at = Utc.with_ymd_and_hms(2026, 5, 2, 19, 30, 0).unwrap();
    let second_seats = seats(&ledger, &["bob", "carol", "alice"]);
    ledger.record_game(second_seats, second_scores, &second, rules.table_fee, second_at);

    ledger::save_ledger(&ledger_path, &ledger).unwrap();
    let reloaded = ledger::load_ledger(&ledger_path).unwrap();
    assert_eq!(reloaded, ledger);

    let totals = ledger::player_totals(&reloaded);
    let summary: Vec<(&str, usize, f64)> = totals
        .iter()
        .map(|t| (t.name.as_str(), t.games, t.total_points))
        .collect();
    assert_eq!(
        summary,
        vec![("Alice", 2, 37.0), ("Bob", 2, 35.0), ("Carol", 2, -92.0)]
    );

    let groups = ledger::group_by_date(&reloaded.results);
    let dates: Vec<NaiveDate> = groups.iter().map(|(d, _)| *d).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        ]
    );
    let day_one = ledger::results_on(&reloaded.results, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
    assert_eq!(ledger::fee_total(&day_one), 10.0);
}

#[test]
fn test_edit_and_delete_by_prefix() {
    let dir = TempDir::new().unwrap();
    let rules = three_player_rules(&dir);

    let mut ledger = Ledger::new();
    for name in ["Alice", "Bob", "Carol"] {
        ledger.add_player(name).unwrap();
    }
    let table = seats(&ledger, &["Alice", "Bob", "Carol"]);
    let settled = calculate(&[50_000, 35_000, 20_000], &rules).unwrap();
    let id = ledger
        .record_game(table.clone(), vec![50_000, 35_000, 20_000], &settled, rules.table_fee, Utc::now())
        .id
        .clone();

    let corrected = calculate(&[60_000, 25_000, 20_000], &rules).unwrap();
    let updated = ledger
        .update_game(&id[..8], table, vec![60_000, 25_000, 20_000], &corrected, rules.table_fee)
        .unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.points, vec![55.0, -25.0, -40.0]);

    let removed = ledger.delete_game(&id[..6]).unwrap();
    assert_eq!(removed.id, id);
    assert!(ledger.results.is_empty());
    assert!(matches!(
        ledger.find_game(&id),
        Err(LedgerError::UnknownGame(_))
    ));
}

#[test]
fn test_rejected_scores_leave_ledger_untouched() {
    let dir = TempDir::new().unwrap();
    let rules = three_player_rules(&dir);

    let short = calculate(&[50_000, 35_000, 19_000], &rules).unwrap_err();
    assert_eq!(
        short,
        SettlementError::TotalMismatch {
            actual: 104_000,
            expected: 105_000,
            difference: -1_000,
        }
    );

    let flat = calculate(&[35_000, 35_000, 35_000], &rules).unwrap_err();
    assert!(matches!(flat, SettlementError::TopScoreTooLow { .. }));

    let ledger_path = dir.path().join("ledger.json");
    let ledger = ledger::load_ledger(&ledger_path).unwrap();
    assert!(ledger.results.is_empty());
    assert!(!ledger_path.exists());
}
