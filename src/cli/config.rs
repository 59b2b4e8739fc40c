//! Config command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use wheelbarrow::config::{load_defaults, parse_args, ConfigTree, ParseOutcome};

use super::settings::{load_settings, OutputFormat};

#[derive(Args)]
pub struct ConfigArgs {
    /// Defaults file (.toml, .json, .yaml or .yml)
    #[arg(value_name = "DEFAULTS")]
    pub defaults: PathBuf,

    /// Output format for the resulting configuration
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Overrides, e.g. `-- --lr 0.5 --model.layers 8`; `-- --help` lists options
    #[arg(last = true, value_name = "OVERRIDES")]
    pub overrides: Vec<String>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let settings = load_settings()?;
    let format = args.format.unwrap_or(settings.output_format);

    let defaults = load_defaults(&args.defaults)?;
    let outcome = parse_args(defaults, &args.overrides)
        .with_context(|| format!("Failed to apply overrides to {}", args.defaults.display()))?;

    match outcome {
        ParseOutcome::Help(text) => print!("{text}"),
        ParseOutcome::Parsed(tree) => println!("{}", render(&tree, format)?),
    }
    Ok(())
}

fn render(tree: &ConfigTree, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(tree).context("Failed to render JSON")?,
        OutputFormat::Toml => toml::to_string_pretty(tree).context("Failed to render TOML")?,
    };
    Ok(rendered.trim_end().to_string())
}
