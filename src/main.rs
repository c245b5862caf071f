//! Arbor CLI - evolve small programs with genetic programming.

// Allow print in the CLI binary, unwrap in its tests
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Arbor - tree-based genetic programming
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_log: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a boolean circuit that computes even parity
    Parity {
        /// Number of input bits (1-16)
        #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u8).range(1..=16))]
        bits: u8,

        /// Population size (overrides the config file)
        #[arg(short, long)]
        population: Option<usize>,

        /// Maximum generations (overrides the config file)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Random seed (default: from config, else random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON run configuration
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::setup_logging(args.json_log, &args.log_level);

    let result = match args.command {
        Commands::Parity {
            bits,
            population,
            generations,
            seed,
            config,
            progress,
        } => cli::parity::execute(bits, population, generations, seed, config, progress),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
