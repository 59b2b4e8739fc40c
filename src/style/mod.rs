//! Plotting style parameters
//!
//! Figures produced by experiment scripts share one look: high-DPI output, a
//! serif font and bold 18pt titles and labels. [`apply_style`] writes those
//! parameters into whatever parameter store the plotting backend exposes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

const DPI: i64 = 200;
const FONT_SIZE: i64 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Int(i) => write!(f, "{i}"),
            StyleValue::Text(s) => f.write_str(s),
        }
    }
}

/// A mutable store of named plotting parameters, e.g. a backend's rc table.
pub trait StyleParams {
    fn set(&mut self, name: &str, value: StyleValue);
}

impl StyleParams for BTreeMap<String, StyleValue> {
    fn set(&mut self, name: &str, value: StyleValue) {
        self.insert(name.to_string(), value);
    }
}

impl StyleParams for HashMap<String, StyleValue> {
    fn set(&mut self, name: &str, value: StyleValue) {
        self.insert(name.to_string(), value);
    }
}

/// Style parameters in the order [`apply_style`] sets them.
pub fn default_style() -> Vec<(&'static str, StyleValue)> {
    let bold = || StyleValue::Text("bold".to_string());
    vec![
        ("figure.dpi", StyleValue::Int(DPI)),
        ("savefig.dpi", StyleValue::Int(DPI)),
        ("font.family", StyleValue::Text("serif".to_string())),
        ("axes.titlesize", StyleValue::Int(FONT_SIZE)),
        ("axes.titleweight", bold()),
        ("font.size", StyleValue::Int(FONT_SIZE)),
        ("font.weight", bold()),
        ("axes.labelweight", bold()),
    ]
}

pub fn apply_style<P: StyleParams + ?Sized>(params: &mut P) {
    for (name, value) in default_style() {
        tracing::trace!(name, value = %value, "setting style parameter");
        params.set(name, value);
    }
}
