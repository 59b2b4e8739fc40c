//! Command-line interface for wheelbarrow
//!
//! Provides `config`, `version` and `style` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod settings;
mod style;
mod version;

/// Convenience utilities for experiment scripts
#[derive(Parser)]
#[command(name = "wheelbarrow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay `--key value` arguments onto a defaults file and print the result
    Config(config::ConfigArgs),

    /// Bump a label in the version ledger and print the new version label
    Version(version::VersionArgs),

    /// Print the plotting style parameters
    Style,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Config(args) => config::run(args),
        Commands::Version(args) => version::run(args),
        Commands::Style => style::run(),
    }
}
