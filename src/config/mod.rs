//! Configuration trees and command-line overlays
//!
//! Defaults are loaded from a file (or built in code) into a [`ConfigTree`];
//! `--key value` arguments are then overlaid onto it, coerced to the kind the
//! defaults declare.

pub mod loader;
pub mod overlay;
pub mod schema;
pub mod tree;

pub use loader::load_defaults;
pub use overlay::{
    apply_args, help_text, parse_args, parse_env_args, parse_os_args, wants_help, ConfigError,
    ParseOutcome,
};
pub use schema::Schema;
pub use tree::{ConfigNode, ConfigTree, ConfigValue, ValueKind};
