use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, validate_settings, Config, Settings};
use crate::settlement::{GameMode, DEFAULT_BONUS_ABOVE, DEFAULT_BONUS_BELOW};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep asking until `parse` accepts the answer.
fn prompt_parsed<T, F>(message: &str, default: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T, String>,
{
    loop {
        let input = prompt_with_default(message, default)?;
        match parse(&input) {
            Ok(v) => return Ok(v),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

/// Parse a comma-separated bonus schedule such as "20, 10, -10, -20".
pub(crate) fn parse_bonus_list(s: &str, expected_len: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect::<Result<Vec<f64>, String>>()?;
    if values.len() != expected_len {
        return Err(format!(
            "expected {} values, got {}",
            expected_len,
            values.len()
        ));
    }
    Ok(values)
}

fn format_bonus_list(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_positive_int(s: &str) -> Result<i64, String> {
    match s.parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err("must be a positive whole number".to_string()),
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("janlog Configuration Wizard");
    println!("===========================");
    println!();

    let defaults = Settings::default();

    let mode = prompt_parsed("Players per table (3 or 4)", "4", |s| {
        GameMode::parse(s).ok_or_else(|| "enter 3 or 4".to_string())
    })?;
    let player_count = mode.player_count();

    // 3-player tables usually start with more points each
    let (base_default, return_default, bonus_default) = match mode {
        GameMode::FourPlayer => (
            defaults.base_point,
            defaults.return_point,
            defaults.rank_bonus.clone(),
        ),
        GameMode::ThreePlayer => (35000, 40000, vec![20.0, 0.0, -20.0]),
    };

    println!();
    println!("Each player starts with the base point. Result points are measured from the return point.");
    let base_point = prompt_parsed("Base point", &base_default.to_string(), parse_positive_int)?;
    let return_point =
        prompt_parsed("Return point", &return_default.to_string(), parse_positive_int)?;

    println!();
    println!("Rank bonus (uma) is added per finishing rank, 1st first, comma separated.");
    let rank_bonus = prompt_parsed("Rank bonus", &format_bonus_list(&bonus_default), |s| {
        parse_bonus_list(s, player_count)
    })?;

    let mut use_conditional_bonus_3p = None;
    let mut conditional_bonus_below_30k = None;
    let mut conditional_bonus_above_30k = None;
    if mode == GameMode::ThreePlayer {
        println!();
        println!("In 3-player games the rank bonus can depend on whether 2nd place finished below 30000.");
        if prompt_yes_no("Use conditional rank bonus?", false)? {
            use_conditional_bonus_3p = Some(true);
            conditional_bonus_below_30k = Some(prompt_parsed(
                "Bonus when 2nd place < 30000",
                &format_bonus_list(&DEFAULT_BONUS_BELOW),
                |s| parse_bonus_list(s, 3),
            )?);
            conditional_bonus_above_30k = Some(prompt_parsed(
                "Bonus when 2nd place >= 30000",
                &format_bonus_list(&DEFAULT_BONUS_ABOVE),
                |s| parse_bonus_list(s, 3),
            )?);
        }
    }

    println!();
    println!("The exchange rate is the money value of 1000 points. The table fee is paid by each game's winner.");
    let exchange_rate = prompt_parsed(
        "Exchange rate",
        &defaults.exchange_rate.to_string(),
        |s| match s.parse::<f64>() {
            Ok(v) if v > 0.0 => Ok(v),
            _ => Err("must be a positive number".to_string()),
        },
    )?;
    let table_fee = prompt_parsed("Table fee", "0", |s| match s.parse::<f64>() {
        Ok(v) if v >= 0.0 => Ok(v),
        _ => Err("must be a non-negative number".to_string()),
    })?;

    let settings = Settings {
        mode,
        rank_bonus,
        exchange_rate,
        base_point,
        return_point,
        table_fee,
        use_conditional_bonus_3p,
        conditional_bonus_below_30k,
        conditional_bonus_above_30k,
    };

    if let Err(errors) = validate_settings(&settings) {
        anyhow::bail!("Settings are invalid: {}", errors.join("; "));
    }

    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let config = Config {
        settings,
        ledger_path: None,
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Add players with `janlog players add <name>` to get started.");

    Ok(())
}
