//! loctrack CLI - Command-line interface
//!
//! Drives tracking sessions against a simulated provider, simulates a
//! host-initiated restart, and inspects the persisted preferences.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::expand_tilde;
use commands::config::ConfigCommands;
use commands::restore::RestoreArgs;
use commands::track::TrackArgs;

#[derive(Parser)]
#[command(name = "loctrack")]
#[command(version, about = "Background location tracking", long_about = None)]
struct Cli {
    /// Preferences file (default: ~/.loctrack/preferences.ini)
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a tracking session and print each fix as a JSON line
    Track(TrackArgs),

    /// Resume tracking from the persisted configuration only
    Restore(RestoreArgs),

    /// View or modify persisted preferences
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let store_path = cli.store.as_deref().map(expand_tilde);

    let result = match cli.command {
        Commands::Track(args) => commands::track::run(args, store_path),
        Commands::Restore(args) => commands::restore::run(args, store_path),
        Commands::Config { command } => commands::config::run(command, store_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
