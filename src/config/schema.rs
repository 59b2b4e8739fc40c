//! Declared leaf kinds and string coercion

use super::overlay::ConfigError;
use super::tree::{ConfigTree, ConfigValue, ValueKind};
use std::collections::BTreeMap;

/// Maps dotted leaf paths to the kind their values must be coerced to.
///
/// Built from a tree of defaults; keys first seen on the command line are
/// declared with whatever kind auto-detection picked for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    kinds: BTreeMap<String, ValueKind>,
}

impl Schema {
    pub fn from_defaults(defaults: &ConfigTree) -> Self {
        let kinds = defaults
            .leaves()
            .into_iter()
            .map(|(path, value)| (path, value.kind()))
            .collect();
        Self { kinds }
    }

    pub fn kind(&self, path: &str) -> Option<ValueKind> {
        self.kinds.get(path).copied()
    }

    pub fn declare(&mut self, path: impl Into<String>, kind: ValueKind) {
        self.kinds.insert(path.into(), kind);
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ValueKind)> {
        self.kinds.iter().map(|(path, kind)| (path.as_str(), *kind))
    }

    /// Coerce `raw` for the leaf at `path`: to the declared kind if there is
    /// one, auto-detected otherwise.
    pub fn coerce(&self, path: &str, raw: &str) -> Result<ConfigValue, ConfigError> {
        match self.kind(path) {
            Some(kind) => coerce(kind, path, raw),
            None => Ok(auto_detect(raw)),
        }
    }
}

/// Convert `raw` to `kind`. Booleans never fail: anything outside
/// `true|1|yes|on` is false.
pub fn coerce(kind: ValueKind, key: &str, raw: &str) -> Result<ConfigValue, ConfigError> {
    let value = match kind {
        ValueKind::Bool => {
            let lowered = raw.to_ascii_lowercase();
            ConfigValue::Bool(matches!(lowered.as_str(), "true" | "1" | "yes" | "on"))
        }
        ValueKind::Int => {
            let parsed = raw.trim().parse::<i64>().map_err(|source| ConfigError::InvalidInt {
                key: key.to_string(),
                value: raw.to_string(),
                source,
            })?;
            ConfigValue::Int(parsed)
        }
        ValueKind::Float => {
            let parsed = raw.trim().parse::<f64>().map_err(|source| ConfigError::InvalidFloat {
                key: key.to_string(),
                value: raw.to_string(),
                source,
            })?;
            ConfigValue::Float(parsed)
        }
        ValueKind::List => ConfigValue::List(split_list(raw)),
        ValueKind::Str => ConfigValue::Str(raw.to_string()),
    };
    Ok(value)
}

/// Guess a kind for a key the defaults do not declare:
/// bool, then int, then float, then comma list, then plain string.
pub fn auto_detect(raw: &str) -> ConfigValue {
    if raw.eq_ignore_ascii_case("true") {
        return ConfigValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return ConfigValue::Bool(false);
    }
    if let Ok(i) = raw.trim().parse::<i64>() {
        return ConfigValue::Int(i);
    }
    if let Ok(f) = raw.trim().parse::<f64>() {
        return ConfigValue::Float(f);
    }
    if raw.contains(',') {
        return ConfigValue::List(split_list(raw));
    }
    ConfigValue::Str(raw.to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}
