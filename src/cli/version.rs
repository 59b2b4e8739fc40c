//! Version command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use wheelbarrow::Ledger;

use super::settings::load_settings;

#[derive(Args)]
pub struct VersionArgs {
    /// Label to bump, e.g. `resnet` (printed as `resnet_v0`, `resnet_v1`, ...)
    #[arg(value_name = "LABEL")]
    pub label: String,

    /// Ledger file [default: .version_numbers in the current directory]
    #[arg(long, value_name = "PATH")]
    pub ledger: Option<PathBuf>,
}

pub fn run(args: VersionArgs) -> Result<()> {
    let ledger_path = match args.ledger {
        Some(path) => path,
        None => load_settings()?.ledger_path,
    };
    let ledger = Ledger::new(ledger_path);
    let label = ledger
        .increment(&args.label)
        .with_context(|| format!("Failed to bump '{}' in {}", args.label, ledger.path().display()))?;
    println!("{label}");
    Ok(())
}
