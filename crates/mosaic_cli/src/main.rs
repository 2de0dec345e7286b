//! Command-line smoke check and demo seeder for `mosaic_core`.
//!
//! # Responsibility
//! - `ping` / `version`: verify core crate wiring.
//! - `seed <db-path> <count>`: fill a mosaic with synthetic submissions
//!   through the real submission path, for demos and load checks.
//!
//! Set `MOSAIC_LOG_DIR` to an absolute path to write core logs.

use clap::{Parser, Subcommand};
use mosaic_core::{MosaicError, MosaicStore};
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const FIRST_NAMES: &[&str] = &[
    "Priya", "Rahul", "Anita", "Raj", "Maya", "Vikram", "Neha", "Arjun", "Meera", "Arun",
    "Kavita", "Suresh", "Deepa", "Sanjay", "Anjali", "Amit",
];
const SURNAMES: &[&str] = &[
    "Sharma", "Patel", "Kumar", "Singh", "Gupta", "Verma", "Shah", "Reddy", "Joshi", "Kapoor",
    "Mehta", "Iyer", "Rao", "Nair", "Bose", "Menon",
];
const MESSAGES: &[&str] = &[
    "Happy celebrations to everyone!",
    "Wishing you joy and prosperity",
    "Let's celebrate together!",
    "May this festival bring light to all",
    "Spreading joy and cheer",
    "Light up the world with kindness",
    "Celebrating with love and light",
];

/// Mosaic core smoke check and demo seeder.
#[derive(Debug, Parser)]
#[command(name = "mosaic_cli", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Print the core health check and version (default).
    Ping,
    /// Print the core version.
    Version,
    /// Submit synthetic entries through the normal submission path.
    Seed {
        /// SQLite database to open or create.
        db_path: PathBuf,
        /// Number of submissions to attempt.
        count: u32,
    },
}

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("MOSAIC_LOG_DIR") {
        if let Err(err) = mosaic_core::init_logging(mosaic_core::default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match Cli::parse().command.unwrap_or(Commands::Ping) {
        Commands::Ping => {
            println!("mosaic_core ping={}", mosaic_core::ping());
            println!("mosaic_core version={}", mosaic_core::core_version());
            ExitCode::SUCCESS
        }
        Commands::Version => {
            println!("{}", mosaic_core::core_version());
            ExitCode::SUCCESS
        }
        Commands::Seed { db_path, count } => seed(&db_path, count),
    }
}

fn seed(db_path: &Path, count: u32) -> ExitCode {
    let store = match MosaicStore::open(db_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open `{}`: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let symbols: Vec<String> = store
        .settings()
        .symbols
        .into_iter()
        .map(|symbol| symbol.filename)
        .collect();
    let mut rng = rand::thread_rng();
    let mut accepted = 0_u32;

    for attempt in 1..=count {
        let name = format!(
            "{} {}",
            FIRST_NAMES.choose(&mut rng).unwrap_or(&"Guest"),
            SURNAMES.choose(&mut rng).unwrap_or(&"")
        );
        let message = MESSAGES.choose(&mut rng).unwrap_or(&"Hello");
        let symbol = symbols.choose(&mut rng).map_or("", String::as_str);

        match store.submit_with_rng(&name, message, symbol, &mut rng) {
            Ok(entry) => {
                accepted += 1;
                println!("[{attempt}/{count}] added {} for {name}", entry.id);
            }
            Err(err @ MosaicError::CapacityExhausted { .. }) => {
                println!("[{attempt}/{count}] stopped: {err}");
                break;
            }
            Err(err) => println!("[{attempt}/{count}] rejected: {err}"),
        }
    }

    println!("added {accepted} of {count} entries");
    ExitCode::SUCCESS
}
