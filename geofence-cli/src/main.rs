//! GeoFence CLI - Command-line interface
//!
//! Replays recorded position tracks against the fences defined in an INI
//! configuration file and prints the resulting enter/exit events.

mod commands;
mod error;
mod track;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::distance::DistanceArgs;
use commands::replay::ReplayArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "geofence")]
#[command(version, about = "Circular geofence evaluation", long_about = None)]
struct Cli {
    /// Enable debug logging (overrides the config file level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded track through the configured fences
    Replay {
        /// INI configuration file with [fence.*] sections
        #[arg(short, long)]
        config: PathBuf,

        /// Track file with one "latitude,longitude" pair per line
        #[arg(short, long)]
        track: PathBuf,

        /// Delay between samples in milliseconds [default: 100]
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Print one JSON object per line instead of text
        #[arg(long)]
        json: bool,

        /// Also print every position update
        #[arg(long)]
        positions: bool,

        /// Report an exit when the first sample is outside a fence
        #[arg(long)]
        report_initial_outside: bool,
    },

    /// Validate a configuration file and list its fences
    Check {
        /// INI configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the great-circle distance between two points
    #[command(allow_negative_numbers = true)]
    Distance {
        /// Latitude of the first point in degrees
        lat1: f64,
        /// Longitude of the first point in degrees
        lon1: f64,
        /// Latitude of the second point in degrees
        lat2: f64,
        /// Longitude of the second point in degrees
        lon2: f64,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Replay {
            config,
            track,
            interval_ms,
            json,
            positions,
            report_initial_outside,
        } => commands::replay::run(ReplayArgs {
            config,
            track,
            interval_ms,
            json,
            positions,
            report_initial_outside,
            verbose: cli.verbose,
        }),

        Commands::Check { config } => commands::check::run(CheckArgs {
            config,
            verbose: cli.verbose,
        }),

        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => commands::distance::run(DistanceArgs {
            from: (lat1, lon1),
            to: (lat2, lon2),
        }),
    }
}
