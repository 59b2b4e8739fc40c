//! Nested configuration tree types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a configuration leaf. Overlaid values are coerced to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    List,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::List => "list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf value in a configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Int(_) => ValueKind::Int,
            ConfigValue::Float(_) => ValueKind::Float,
            ConfigValue::Str(_) => ValueKind::Str,
            ConfigValue::List(_) => ValueKind::List,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Renders values the way the help listing shows defaults: `True`/`False`,
/// floats in shortest form with a fractional digit (exponent form `1e+16`,
/// `1e-05` below 1e-4 or from 1e16 up), lists as `['a', 'b']`.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(true) => f.write_str("True"),
            ConfigValue::Bool(false) => f.write_str("False"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Float(v) => write!(f, "{}", format_float(*v)),
            ConfigValue::Str(s) => f.write_str(s),
            ConfigValue::List(items) => {
                let quoted: Vec<String> = items.iter().map(|item| format!("'{item}'")).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v == f64::INFINITY {
        "inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if v != 0.0 && (v.abs() < 1e-4 || v.abs() >= 1e16) {
        exponent_form(v)
    } else if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// `1e16` -> `1e+16`, `1.5e-5` -> `1.5e-05`.
fn exponent_form(v: f64) -> String {
    let plain = format!("{v:e}");
    let Some((mantissa, exponent)) = plain.split_once('e') else {
        return plain;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ConfigValue {
                fn from(value: $ty) -> Self {
                    ConfigValue::$variant(value.into())
                }
            }

            impl From<$ty> for ConfigNode {
                fn from(value: $ty) -> Self {
                    ConfigNode::Leaf(ConfigValue::from(value))
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i64 => Int,
    i32 => Int,
    f64 => Float,
    String => Str,
    &str => Str,
    Vec<String> => List,
}

/// Either a nested sub-tree or a leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigNode {
    Table(ConfigTree),
    Leaf(ConfigValue),
}

impl ConfigNode {
    pub fn as_table(&self) -> Option<&ConfigTree> {
        match self {
            ConfigNode::Table(table) => Some(table),
            ConfigNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&ConfigValue> {
        match self {
            ConfigNode::Leaf(value) => Some(value),
            ConfigNode::Table(_) => None,
        }
    }
}

impl From<ConfigValue> for ConfigNode {
    fn from(value: ConfigValue) -> Self {
        ConfigNode::Leaf(value)
    }
}

impl From<ConfigTree> for ConfigNode {
    fn from(table: ConfigTree) -> Self {
        ConfigNode::Table(table)
    }
}

/// Insertion-ordered mapping of keys to sub-trees or leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree(IndexMap<String, ConfigNode>);

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for defaults declared in code.
    pub fn with(mut self, key: impl Into<String>, node: impl Into<ConfigNode>) -> Self {
        self.insert(key, node);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<ConfigNode>) -> Option<ConfigNode> {
        self.0.insert(key.into(), node.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigNode> {
        self.0.get_mut(key)
    }

    /// Look up a dot-separated path such as `model.layers`.
    pub fn get_path(&self, path: &str) -> Option<&ConfigNode> {
        let mut segments = path.split('.');
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            node = node.as_table()?.get(segment)?;
        }
        Some(node)
    }

    /// Leaf value at a dot-separated path, if the path ends at a leaf.
    pub fn leaf(&self, path: &str) -> Option<&ConfigValue> {
        self.get_path(path)?.as_leaf()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigNode)> {
        self.0.iter()
    }

    /// All leaves with their dotted paths, depth-first in insertion order.
    pub fn leaves(&self) -> Vec<(String, &ConfigValue)> {
        let mut out = Vec::new();
        collect_leaves(self, "", &mut out);
        out
    }

    /// Child table for `key`, created empty if absent. `None` when `key`
    /// already holds a leaf.
    pub(crate) fn table_entry(&mut self, key: &str) -> Option<&mut ConfigTree> {
        match self.0.entry(key.to_string()).or_insert_with(|| ConfigNode::Table(ConfigTree::new())) {
            ConfigNode::Table(table) => Some(table),
            ConfigNode::Leaf(_) => None,
        }
    }
}

fn collect_leaves<'a>(tree: &'a ConfigTree, prefix: &str, out: &mut Vec<(String, &'a ConfigValue)>) {
    for (key, node) in tree.iter() {
        let path = join_path(prefix, key);
        match node {
            ConfigNode::Table(table) => collect_leaves(table, &path, out),
            ConfigNode::Leaf(value) => out.push((path, value)),
        }
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

impl TryFrom<serde_json::Value> for ConfigTree {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl From<&ConfigTree> for serde_json::Value {
    fn from(tree: &ConfigTree) -> Self {
        tree.iter()
            .map(|(key, node)| {
                let value = match node {
                    ConfigNode::Table(table) => serde_json::Value::from(table),
                    ConfigNode::Leaf(leaf) => leaf_to_json(leaf),
                };
                (key.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}

fn leaf_to_json(value: &ConfigValue) -> serde_json::Value {
    match value {
        ConfigValue::Bool(b) => (*b).into(),
        ConfigValue::Int(i) => (*i).into(),
        ConfigValue::Float(f) => (*f).into(),
        ConfigValue::Str(s) => s.clone().into(),
        ConfigValue::List(items) => items.clone().into(),
    }
}
