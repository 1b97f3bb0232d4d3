use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use janlog::config::{self, Config};
use janlog::ledger::{self, GameRecord, Ledger, LedgerError};
use janlog::output;
use janlog::settlement::{self, RuleConfig, SettlementError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_REJECTED: i32 = 1;
const EXIT_STORAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Settle scores without saving anything
    Calc {
        /// Raw end-of-game scores in seat order
        #[arg(required = true, allow_negative_numbers = true)]
        scores: Vec<i64>,
    },
    /// Settle scores and save the game
    Record {
        /// Players in seat order, comma separated (names or ids)
        #[arg(short, long, value_delimiter = ',', required = true)]
        players: Vec<String>,
        /// Raw end-of-game scores in seat order
        #[arg(required = true, allow_negative_numbers = true)]
        scores: Vec<i64>,
    },
    /// Re-settle a recorded game with corrected scores
    Edit {
        /// Game id or unique id prefix
        id: String,
        /// Replacement players in seat order (keeps the recorded seats if omitted)
        #[arg(short, long, value_delimiter = ',')]
        players: Option<Vec<String>>,
        /// Corrected raw scores in seat order
        #[arg(required = true, allow_negative_numbers = true)]
        scores: Vec<i64>,
    },
    /// Delete a recorded game
    Delete {
        /// Game id or unique id prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show recorded games grouped by day (default: today)
    History {
        /// Only games on this date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "all")]
        date: Option<NaiveDate>,
        /// Every day, newest first
        #[arg(long)]
        all: bool,
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Show total points per player across all games
    Standings {
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Manage the player roster
    Players {
        #[command(subcommand)]
        action: Option<PlayerCommands>,
    },
    /// Show the active game settings
    Settings,
    /// Interactively create a config file
    Init,
}

#[derive(Subcommand, Debug)]
enum PlayerCommands {
    /// List registered players
    List,
    /// Register a new player
    Add { name: String },
    /// Rename a player (name or id)
    Rename { player: String, new_name: String },
    /// Remove a player from the roster; recorded games are kept
    Remove { player: String },
}

#[derive(Parser, Debug)]
#[command(name = "janlog")]
#[command(about = "Score tracker and settlement calculator for 3- and 4-player tile games", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/janlog/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to ledger file (defaults to ~/.config/janlog/ledger.json)
    #[arg(long, global = true)]
    ledger: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Why a command did not complete
enum Failure {
    /// Input was rejected; nothing was saved
    Rejected(String),
    Storage(anyhow::Error),
}

impl From<SettlementError> for Failure {
    fn from(e: SettlementError) -> Self {
        Failure::Rejected(e.to_string())
    }
}

impl From<LedgerError> for Failure {
    fn from(e: LedgerError) -> Self {
        Failure::Rejected(e.to_string())
    }
}

/// Everything a command needs after config and ledger are loaded
struct Context {
    config: Config,
    rules: RuleConfig,
    ledger: Ledger,
    ledger_path: PathBuf,
    use_colors: bool,
}

impl Context {
    fn save(&self) -> Result<(), Failure> {
        ledger::save_ledger(&self.ledger_path, &self.ledger).map_err(Failure::Storage)
    }

    fn seat_names(&self, seats: &[String]) -> Vec<String> {
        seats
            .iter()
            .map(|id| self.ledger.player_name(id).to_string())
            .collect()
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::History {
        date: None,
        all: false,
        tsv: false,
    });
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = config::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate settings at startup
    if let Err(errors) = config::validate_settings(&config.settings) {
        eprintln!("Settings errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let rules = RuleConfig::from_settings(&config.settings);
    tracing::debug!(?rules, "active rules");

    let ledger_path = cli
        .ledger
        .map(PathBuf::from)
        .or_else(|| config.ledger_path.clone())
        .unwrap_or_else(ledger::get_ledger_path);

    let ledger = match ledger::load_ledger(&ledger_path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Ledger error: {:#}", e);
            std::process::exit(EXIT_STORAGE);
        }
    };

    let mut ctx = Context {
        config,
        rules,
        ledger,
        ledger_path,
        use_colors: output::should_use_colors(),
    };

    let outcome = match command {
        Commands::Calc { scores } => run_calc(&ctx, &scores),
        Commands::Record { players, scores } => run_record(&mut ctx, &players, scores),
        Commands::Edit {
            id,
            players,
            scores,
        } => run_edit(&mut ctx, &id, players, scores),
        Commands::Delete { id, yes } => run_delete(&mut ctx, &id, yes),
        Commands::History { date, all, tsv } => run_history(&ctx, date, all, tsv),
        Commands::Standings { tsv } => run_standings(&ctx, tsv),
        Commands::Players { action } => {
            run_players(&mut ctx, action.unwrap_or(PlayerCommands::List))
        }
        Commands::Settings => run_settings(&ctx),
        Commands::Init => Ok(()),
    };

    match outcome {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(Failure::Rejected(msg)) => {
            eprintln!("{}", msg);
            std::process::exit(EXIT_REJECTED);
        }
        Err(Failure::Storage(e)) => {
            eprintln!("Storage error: {:#}", e);
            std::process::exit(EXIT_STORAGE);
        }
    }
}

fn run_calc(ctx: &Context, scores: &[i64]) -> Result<(), Failure> {
    let result = settlement::calculate(scores, &ctx.rules)?;
    let names: Vec<String> = (1..=scores.len()).map(|i| format!("Seat {}", i)).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    println!(
        "{}",
        output::format_settlement(&name_refs, scores, &result, ctx.use_colors)
    );
    Ok(())
}

fn run_record(ctx: &mut Context, players: &[String], scores: Vec<i64>) -> Result<(), Failure> {
    let result = settlement::calculate(&scores, &ctx.rules)?;
    let seats = ctx
        .ledger
        .resolve_seats(players, ctx.rules.player_count())?;
    let names = ctx.seat_names(&seats);

    let record = ctx.ledger.record_game(
        seats,
        scores.clone(),
        &result,
        ctx.rules.table_fee,
        Utc::now(),
    );
    let short_id = record.short_id().to_string();
    tracing::info!(id = %record.id, "recorded game");
    ctx.save()?;

    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    println!(
        "{}",
        output::format_settlement(&name_refs, &scores, &result, ctx.use_colors)
    );
    println!("Saved game {}", short_id);
    Ok(())
}

fn run_edit(
    ctx: &mut Context,
    id: &str,
    players: Option<Vec<String>>,
    scores: Vec<i64>,
) -> Result<(), Failure> {
    let existing = ctx.ledger.find_game(id)?.clone();
    let player_count = ctx.rules.player_count();

    // Recorded seats are reused as-is so games with removed players stay editable
    let seats = match players {
        Some(keys) => ctx.ledger.resolve_seats(&keys, player_count)?,
        None if existing.players.len() == player_count => existing.players.clone(),
        None => {
            return Err(LedgerError::SeatCountMismatch {
                expected: player_count,
                actual: existing.players.len(),
            }
            .into())
        }
    };

    let result = settlement::calculate(&scores, &ctx.rules)?;
    let names = ctx.seat_names(&seats);
    ctx.ledger
        .update_game(&existing.id, seats, scores.clone(), &result, ctx.rules.table_fee)?;
    ctx.save()?;

    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    println!(
        "{}",
        output::format_settlement(&name_refs, &scores, &result, ctx.use_colors)
    );
    println!("Updated game {}", existing.short_id());
    Ok(())
}

fn run_delete(ctx: &mut Context, id: &str, yes: bool) -> Result<(), Failure> {
    let record = ctx.ledger.find_game(id)?;
    let summary = describe_game(&ctx.ledger, record);

    if !yes {
        let confirmed = confirm(&format!("Delete game {}?", summary)).map_err(Failure::Storage)?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let full_id = record.id.clone();
    let removed = ctx.ledger.delete_game(&full_id)?;
    ctx.save()?;
    println!("Deleted game {}", removed.short_id());
    Ok(())
}

fn run_history(ctx: &Context, date: Option<NaiveDate>, all: bool, tsv: bool) -> Result<(), Failure> {
    let ledger = &ctx.ledger;

    if all {
        let groups = ledger::group_by_date(&ledger.results);
        if tsv {
            let records: Vec<&GameRecord> = groups.iter().flat_map(|(_, r)| r.iter().copied()).collect();
            println!("{}", output::format_history_tsv(&records, ledger));
        } else if groups.is_empty() {
            println!("No games recorded.");
        } else {
            let tables: Vec<String> = groups
                .iter()
                .map(|(day, records)| {
                    output::format_history_table(&day.to_string(), records, ledger, ctx.use_colors)
                })
                .collect();
            println!("{}", tables.join("\n\n"));
        }
        return Ok(());
    }

    let day = date.unwrap_or_else(|| Utc::now().date_naive());
    let records = ledger::results_on(&ledger.results, day);
    if tsv {
        println!("{}", output::format_history_tsv(&records, ledger));
    } else {
        println!(
            "{}",
            output::format_history_table(&day.to_string(), &records, ledger, ctx.use_colors)
        );
    }
    Ok(())
}

fn run_standings(ctx: &Context, tsv: bool) -> Result<(), Failure> {
    let totals = ledger::player_totals(&ctx.ledger);
    if tsv {
        println!("{}", output::format_standings_tsv(&totals));
    } else {
        println!("{}", output::format_standings(&totals, ctx.use_colors));
    }
    Ok(())
}

fn run_players(ctx: &mut Context, action: PlayerCommands) -> Result<(), Failure> {
    match action {
        PlayerCommands::List => {
            println!("{}", output::format_players(&ctx.ledger));
            return Ok(());
        }
        PlayerCommands::Add { name } => {
            let player = ctx.ledger.add_player(&name)?;
            println!("Added {}", player.name);
        }
        PlayerCommands::Rename { player, new_name } => {
            ctx.ledger.rename_player(&player, &new_name)?;
            println!("Renamed {} to {}", player, new_name.trim());
        }
        PlayerCommands::Remove { player } => {
            let removed = ctx.ledger.remove_player(&player)?;
            println!("Removed {} (recorded games are kept)", removed.name);
        }
    }
    ctx.save()
}

fn run_settings(ctx: &Context) -> Result<(), Failure> {
    let yaml = serde_saphyr::to_string(&ctx.config.settings)
        .map_err(|e| Failure::Storage(anyhow::anyhow!("Failed to serialize settings: {}", e)))?;
    println!("{}", yaml.trim_end());
    println!();
    if let Some(total) = ctx.rules.expected_total() {
        println!(
            "Expected total: {} ({} players x {})",
            total,
            ctx.rules.player_count(),
            ctx.rules.base_point
        );
    }
    let fee_points = ctx.rules.fee_points();
    if fee_points > 0.0 {
        println!("Winner pays {} pts per game", output::format_points(fee_points).trim_start_matches('+'));
    }
    println!("Ledger: {}", ctx.ledger_path.display());
    Ok(())
}

/// "0f8e2b9a (2026-05-01 18:05: Alice +45, Bob +10, ...)"
fn describe_game(ledger: &Ledger, record: &GameRecord) -> String {
    let seats: Vec<String> = record
        .players
        .iter()
        .zip(&record.points)
        .map(|(id, points)| format!("{} {}", ledger.player_name(id), output::format_points(*points)))
        .collect();
    format!(
        "{} ({}: {})",
        record.short_id(),
        record.date.format("%Y-%m-%d %H:%M"),
        seats.join(", ")
    )
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    print!("{} [y/N]: ", message);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
