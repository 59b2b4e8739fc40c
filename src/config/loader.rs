//! Defaults file loading

use super::tree::ConfigTree;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a defaults tree from a TOML, JSON or YAML file, picked by extension.
pub fn load_defaults(path: &Path) -> Result<ConfigTree> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading defaults file: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let tree = match ext.as_str() {
        "toml" => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML defaults: {}", path.display()))?,
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON defaults: {}", path.display()))?,
        "yaml" | "yml" => parse_yaml_defaults(&content, path)?,
        other => anyhow::bail!(
            "Unsupported defaults extension '.{}' for file {}",
            other,
            path.display()
        ),
    };

    tracing::debug!("Loaded defaults from {}", path.display());
    Ok(tree)
}

/// An empty YAML document is an empty tree rather than an error.
fn parse_yaml_defaults(content: &str, path: &Path) -> Result<ConfigTree> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", path.display()))?;

    if raw.is_null() {
        return Ok(ConfigTree::new());
    }

    serde_yaml::from_value(raw).with_context(|| format!("Invalid YAML defaults: {}", path.display()))
}
