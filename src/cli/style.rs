//! Style command implementation

use anyhow::Result;
use std::collections::BTreeMap;
use wheelbarrow::style::{apply_style, StyleValue};

pub fn run() -> Result<()> {
    let mut params: BTreeMap<String, StyleValue> = BTreeMap::new();
    apply_style(&mut params);
    for (name, value) in &params {
        println!("{name} = {value}");
    }
    Ok(())
}
