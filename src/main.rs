//! wheelbarrow: convenience utilities for experiment scripts
//!
//! Overlays command-line arguments onto configuration defaults, hands out
//! version labels from a ledger file and prints plotting style parameters.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
