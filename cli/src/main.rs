mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    EntryEdit, cmd_clear, cmd_delete, cmd_goal_set, cmd_goal_show, cmd_history, cmd_log,
    cmd_today, cmd_update,
};
use crate::config::Config;
use protrack_core::models::DEFAULT_HISTORY_DAYS;
use protrack_core::store;

#[derive(Parser)]
#[command(
    name = "protrack",
    version,
    about = "A simple daily protein logger",
    long_about = "Log what you eat, see how close you are to your daily protein goal,\nand look back over the last weeks. Everything stays in one local SQLite file."
)]
struct Cli {
    /// Path to the database file (default: platform data directory)
    #[arg(long, global = true, env = "PROTRACK_DB", value_name = "PATH")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a food entry
    Log {
        /// Food name (e.g. "Chicken breast")
        name: String,
        /// Protein in grams (e.g. "32" or "32g")
        protein: String,
        /// Calories (e.g. "165" or "165kcal")
        #[arg(short, long)]
        calories: Option<String>,
        /// Day to log for (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show entries and progress for a day (defaults to today)
    Today {
        /// Day to show (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update an entry (name, protein, or calories)
    Update {
        /// Entry ID to update
        entry_id: i64,
        /// New food name
        #[arg(long)]
        name: Option<String>,
        /// New protein amount in grams
        #[arg(long)]
        protein: Option<String>,
        /// New calorie amount
        #[arg(long, conflicts_with = "clear_calories")]
        calories: Option<String>,
        /// Remove the calorie value
        #[arg(long)]
        clear_calories: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry by ID
    Delete {
        /// Entry ID to delete
        entry_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show per-day totals for the last N days
    History {
        /// Number of days to show, including today
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change the daily protein goal
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Delete every logged entry (the goal is kept)
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Show the daily protein goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the daily protein goal
    Set {
        /// Goal in grams (e.g. "150" or "150g")
        grams: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    tracing::debug!(path = %config.db_path.display(), "opening database");
    let handle = store::shared(&config.db_path)?;
    let tracker = store::lock(handle)?;

    match cli.command {
        Commands::Log {
            name,
            protein,
            calories,
            date,
            json,
        } => cmd_log(
            &tracker,
            &name,
            &protein,
            calories.as_deref(),
            date.as_deref(),
            json,
        ),
        Commands::Today { date, json } => cmd_today(&tracker, date.as_deref(), json),
        Commands::Update {
            entry_id,
            name,
            protein,
            calories,
            clear_calories,
            json,
        } => {
            let edit = EntryEdit {
                name: name.as_deref(),
                protein: protein.as_deref(),
                calories: calories.as_deref(),
                clear_calories,
            };
            cmd_update(&tracker, entry_id, &edit, json)
        }
        Commands::Delete { entry_id, json } => cmd_delete(&tracker, entry_id, json),
        Commands::History { days, json } => cmd_history(&tracker, days, json),
        Commands::Goal { command } => match command {
            GoalCommands::Show { json } => cmd_goal_show(&tracker, json),
            GoalCommands::Set { grams, json } => cmd_goal_set(&tracker, &grams, json),
        },
        Commands::Clear { yes, json } => cmd_clear(&tracker, yes, json),
    }
}
