//! wheelbarrow: small utilities for experiment scripts
//!
//! - [`memo`]: disk-backed memoization with an in-process layer on top
//! - [`config`]: nested configuration trees and `--key value` overlays
//! - [`ledger`]: monotonically increasing version labels kept in a flat file
//! - [`style`]: plotting style parameters

pub mod config;
pub mod ledger;
pub mod memo;
pub mod style;

pub use config::{parse_args, ConfigNode, ConfigTree, ConfigValue, ParseOutcome, ValueKind};
pub use ledger::{increment_version, Ledger};
pub use memo::{memoize_to_disk, Memo};
pub use style::apply_style;
