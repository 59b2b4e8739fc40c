//! CLI settings
//!
//! Resolved with precedence CLI flags > `WHEELBARROW_*` env > `wheelbarrow.toml`
//! in the current directory > built-in defaults.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wheelbarrow::ledger::LEDGER_FILE_NAME;

pub const SETTINGS_FILE: &str = "wheelbarrow.toml";
const ENV_PREFIX: &str = "WHEELBARROW_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Toml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Ledger used by `version` when `--ledger` is not given
    pub ledger_path: PathBuf,
    /// Output format used by `config` when `--format` is not given
    pub output_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self { ledger_path: PathBuf::from(LEDGER_FILE_NAME), output_format: OutputFormat::Json }
    }
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(file: &Path) -> Result<Settings> {
    let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .with_context(|| format!("Invalid settings (file: {}, env: {ENV_PREFIX}*)", file.display()))?;
    tracing::debug!(?settings, "resolved settings");
    Ok(settings)
}
