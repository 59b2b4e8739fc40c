//! `--key value` overlays onto a configuration tree
//!
//! Tokens are scanned left to right. `--key value` sets `key`, a `--key`
//! followed by another `--` token (or nothing) is a boolean flag, dotted keys
//! address nested tables and anything else is skipped. Values are coerced to
//! the kind the defaults declare for that key, or auto-detected for new keys.
//! `--help`/`-h` anywhere short-circuits into [`ParseOutcome::Help`].

use super::schema::Schema;
use super::tree::{join_path, ConfigNode, ConfigTree};
use std::ffi::OsString;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

const HELP_RULE_WIDTH: usize = 50;

/// Value used for a `--flag` with no value after it.
const FLAG_VALUE: &str = "True";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--{key}: '{value}' is not a valid integer")]
    InvalidInt { key: String, value: String, source: ParseIntError },

    #[error("--{key}: '{value}' is not a valid float")]
    InvalidFloat { key: String, value: String, source: ParseFloatError },

    #[error("--{key}: '{segment}' is a value, not a table")]
    NotATable { key: String, segment: String },

    #[error("--{key}: cannot replace a table with a value")]
    TableOverwrite { key: String },

    #[error("'{arg}' does not name a configuration key")]
    EmptyKey { arg: String },
}

/// Result of parsing an argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The overlaid configuration.
    Parsed(ConfigTree),
    /// `--help` or `-h` was given; holds the option listing.
    Help(String),
}

impl ParseOutcome {
    pub fn into_parsed(self) -> Option<ConfigTree> {
        match self {
            ParseOutcome::Parsed(tree) => Some(tree),
            ParseOutcome::Help(_) => None,
        }
    }
}

/// Overlay `argv` onto `config` and return it, or the help listing when
/// `--help`/`-h` appears anywhere in `argv`.
pub fn parse_args<S: AsRef<str>>(mut config: ConfigTree, argv: &[S]) -> Result<ParseOutcome, ConfigError> {
    if wants_help(argv) {
        return Ok(ParseOutcome::Help(help_text(&config)));
    }
    apply_args(&mut config, argv)?;
    Ok(ParseOutcome::Parsed(config))
}

/// [`parse_args`] over the process arguments, without the program name.
pub fn parse_env_args(config: ConfigTree) -> Result<ParseOutcome, ConfigError> {
    parse_os_args(config, std::env::args_os().skip(1))
}

/// [`parse_args`] over OS strings; invalid UTF-8 is replaced lossily.
pub fn parse_os_args<I>(config: ConfigTree, args: I) -> Result<ParseOutcome, ConfigError>
where
    I: IntoIterator<Item = OsString>,
{
    let argv: Vec<String> = args.into_iter().map(|arg| arg.to_string_lossy().into_owned()).collect();
    parse_args(config, &argv)
}

pub fn wants_help<S: AsRef<str>>(argv: &[S]) -> bool {
    argv.iter().any(|arg| matches!(arg.as_ref(), "--help" | "-h"))
}

/// Overlay `argv` onto `config` in place. Help tokens are not special here.
pub fn apply_args<S: AsRef<str>>(config: &mut ConfigTree, argv: &[S]) -> Result<(), ConfigError> {
    let mut schema = Schema::from_defaults(config);
    let mut i = 0;
    while i < argv.len() {
        let Some(key) = argv[i].as_ref().strip_prefix("--") else {
            tracing::debug!(arg = argv[i].as_ref(), "skipping positional argument");
            i += 1;
            continue;
        };
        let raw = match argv.get(i + 1).map(AsRef::<str>::as_ref) {
            Some(next) if !next.starts_with("--") => {
                i += 2;
                next
            }
            _ => {
                i += 1;
                FLAG_VALUE
            }
        };
        set_value(config, &mut schema, key, raw)?;
    }
    Ok(())
}

fn set_value(
    config: &mut ConfigTree,
    schema: &mut Schema,
    key: &str,
    raw: &str,
) -> Result<(), ConfigError> {
    if key.split('.').any(str::is_empty) {
        return Err(ConfigError::EmptyKey { arg: format!("--{key}") });
    }

    let (parents, last) = match key.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, key),
    };

    let mut table = config;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            table = table.table_entry(segment).ok_or_else(|| ConfigError::NotATable {
                key: key.to_string(),
                segment: segment.to_string(),
            })?;
        }
    }

    if let Some(ConfigNode::Table(_)) = table.get(last) {
        return Err(ConfigError::TableOverwrite { key: key.to_string() });
    }

    let value = schema.coerce(key, raw)?;
    if schema.kind(key).is_none() {
        tracing::debug!(key, kind = %value.kind(), "adding key absent from defaults");
        schema.declare(key, value.kind());
    }
    tracing::debug!(key, value = %value, "overlaid config value");
    table.insert(last, value);
    Ok(())
}

/// Listing of every path in `config`: `--path.*` for tables and
/// `--path <kind> (default: value)` for leaves.
pub fn help_text(config: &ConfigTree) -> String {
    let mut out = String::from("Available configuration options:\n");
    out.push_str(&"=".repeat(HELP_RULE_WIDTH));
    out.push('\n');
    write_help(config, "", &mut out);
    out
}

fn write_help(tree: &ConfigTree, prefix: &str, out: &mut String) {
    for (key, node) in tree.iter() {
        let path = join_path(prefix, key);
        match node {
            ConfigNode::Table(table) => {
                out.push_str(&format!("  --{path}.*\n"));
                write_help(table, &path, out);
            }
            ConfigNode::Leaf(value) => {
                out.push_str(&format!("  --{path} <{}> (default: {value})\n", value.kind()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tree::ConfigValue;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> ConfigTree {
        ConfigTree::try_from(value).expect("valid tree")
    }

    fn parsed(config: ConfigTree, argv: &[&str]) -> ConfigTree {
        parse_args(config, argv).expect("parse").into_parsed().expect("not help")
    }

    #[test]
    fn test_overlay_keeps_default_kinds() {
        let out = parsed(
            tree(json!({"lr": 0.1, "model": {"layers": 4}})),
            &["--lr", "0.5", "--model.layers", "8"],
        );
        assert_eq!(out, tree(json!({"lr": 0.5, "model": {"layers": 8}})));
        assert_eq!(out.leaf("lr"), Some(&ConfigValue::Float(0.5)));
        assert_eq!(out.leaf("model.layers"), Some(&ConfigValue::Int(8)));
    }

    #[test]
    fn test_bare_flag_sets_true() {
        let out = parsed(tree(json!({"debug": false})), &["--debug"]);
        assert_eq!(out.leaf("debug"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn test_flag_followed_by_another_key() {
        let out = parsed(tree(json!({"debug": false, "seed": 1})), &["--debug", "--seed", "7"]);
        assert_eq!(out.leaf("debug"), Some(&ConfigValue::Bool(true)));
        assert_eq!(out.leaf("seed"), Some(&ConfigValue::Int(7)));
    }

    #[test]
    fn test_list_default_splits_on_commas() {
        let out = parsed(tree(json!({"tags": ["a"]})), &["--tags", "x,y,z"]);
        assert_eq!(out.leaf("tags"), Some(&ConfigValue::List(vec!["x".into(), "y".into(), "z".into()])));
    }

    #[test]
    fn test_bool_default_with_explicit_value() {
        let out = parsed(tree(json!({"debug": true})), &["--debug", "off"]);
        assert_eq!(out.leaf("debug"), Some(&ConfigValue::Bool(false)));
    }

    #[test]
    fn test_new_keys_are_auto_detected() {
        let out = parsed(
            ConfigTree::new(),
            &["--a", "TRUE", "--b", "3", "--c", "2.5", "--d", "x,y", "--e", "plain"],
        );
        assert_eq!(out.leaf("a"), Some(&ConfigValue::Bool(true)));
        assert_eq!(out.leaf("b"), Some(&ConfigValue::Int(3)));
        assert_eq!(out.leaf("c"), Some(&ConfigValue::Float(2.5)));
        assert_eq!(out.leaf("d"), Some(&ConfigValue::List(vec!["x".into(), "y".into()])));
        assert_eq!(out.leaf("e"), Some(&ConfigValue::Str("plain".into())));
    }

    #[test]
    fn test_dotted_keys_create_missing_tables() {
        let out = parsed(tree(json!({"lr": 0.1})), &["--optim.adam.beta", "0.9"]);
        assert_eq!(out.leaf("optim.adam.beta"), Some(&ConfigValue::Float(0.9)));
        assert_eq!(out.leaf("lr"), Some(&ConfigValue::Float(0.1)));
    }

    #[test]
    fn test_new_key_keeps_its_detected_kind_for_later_tokens() {
        let err = parse_args(ConfigTree::new(), &["--seed", "3", "--seed", "abc"]).expect_err("int");
        assert!(matches!(err, ConfigError::InvalidInt { .. }));
    }

    #[test]
    fn test_positional_tokens_are_skipped() {
        let out = parsed(tree(json!({"n": 1})), &["stray", "--n", "2", "leftover"]);
        assert_eq!(out, tree(json!({"n": 2})));
    }

    #[test]
    fn test_malformed_number_is_fatal() {
        let err = parse_args(tree(json!({"model": {"layers": 4}})), &["--model.layers", "many"])
            .expect_err("malformed int");
        assert_eq!(err.to_string(), "--model.layers: 'many' is not a valid integer");

        let err = parse_args(tree(json!({"lr": 0.1})), &["--lr"]).expect_err("flag on float");
        assert!(matches!(err, ConfigError::InvalidFloat { ref value, .. } if value == "True"));
    }

    #[test]
    fn test_dotted_path_through_leaf_is_rejected() {
        let err = parse_args(tree(json!({"lr": 0.1})), &["--lr.x", "1"]).expect_err("leaf parent");
        assert!(matches!(err, ConfigError::NotATable { ref segment, .. } if segment == "lr"));
    }

    #[test]
    fn test_value_cannot_replace_table() {
        let err = parse_args(tree(json!({"model": {"layers": 4}})), &["--model", "big"])
            .expect_err("table overwrite");
        assert!(matches!(err, ConfigError::TableOverwrite { .. }));
    }

    #[test]
    fn test_empty_key_segments_are_rejected() {
        assert!(matches!(
            parse_args(ConfigTree::new(), &["--", "1"]),
            Err(ConfigError::EmptyKey { .. })
        ));
        assert!(matches!(
            parse_args(ConfigTree::new(), &["--a..b", "1"]),
            Err(ConfigError::EmptyKey { .. })
        ));
    }

    #[test]
    fn test_help_anywhere_wins_over_invalid_args() {
        let defaults = tree(json!({"lr": 0.1}));
        let outcome = parse_args(defaults.clone(), &["--lr", "oops", "-h"]).expect("help");
        assert!(matches!(outcome, ParseOutcome::Help(_)));

        let mut in_place = defaults.clone();
        apply_args(&mut in_place, &["--lr", "0.3"]).expect("apply");
        assert_eq!(in_place.leaf("lr"), Some(&ConfigValue::Float(0.3)));
    }

    #[test]
    fn test_os_args_are_overlaid() {
        let argv = ["--lr", "0.5", "--debug"].map(OsString::from);
        let out = parse_os_args(tree(json!({"lr": 0.1, "debug": false})), argv)
            .expect("parse")
            .into_parsed()
            .expect("not help");
        assert_eq!(out.leaf("lr"), Some(&ConfigValue::Float(0.5)));
        assert_eq!(out.leaf("debug"), Some(&ConfigValue::Bool(true)));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_args_do_not_panic() {
        use std::os::unix::ffi::OsStringExt;

        let argv = vec![OsString::from("--name"), OsString::from_vec(vec![b'r', 0xff, b'n'])];
        let out = parse_os_args(tree(json!({"name": "run"})), argv)
            .expect("parse")
            .into_parsed()
            .expect("not help");
        assert_eq!(out.leaf("name"), Some(&ConfigValue::Str("r\u{fffd}n".into())));
    }

    #[test]
    fn test_env_args_parse_without_panicking() {
        // Whatever the harness was invoked with, reading them must not panic.
        let _ = parse_env_args(ConfigTree::new());
    }

    #[test]
    fn test_help_lists_every_path() {
        let defaults = tree(json!({
            "lr": 0.1,
            "model": {"layers": 4},
            "tags": ["a"],
            "debug": false,
            "name": "run"
        }));
        let ParseOutcome::Help(text) = parse_args(defaults, &["--help"]).expect("help") else {
            panic!("expected help");
        };
        let expected = "\
Available configuration options:
==================================================
  --lr <float> (default: 0.1)
  --model.*
  --model.layers <int> (default: 4)
  --tags <list> (default: ['a'])
  --debug <bool> (default: False)
  --name <str> (default: run)
";
        similar_asserts::assert_eq!(text, expected);
    }
}
