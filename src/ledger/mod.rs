//! Version labels backed by a flat `label count` file
//!
//! Each call to [`Ledger::increment`] bumps the count stored for a label and
//! rewrites the whole file, sorted by label. The file is read and written
//! without locking.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ledger file name used when no explicit path is given, relative to the
/// current directory.
pub const LEDGER_FILE_NAME: &str = ".version_numbers";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write ledger {}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("ledger line {line}: '{value}' is not a version number")]
    InvalidCount {
        line: usize,
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid version label '{label}': labels must be non-empty and contain no whitespace")]
    InvalidLabel { label: String },

    #[error("version counter for '{label}' overflowed")]
    Overflow { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The `.version_numbers` ledger in the current directory.
    pub fn in_current_dir() -> Self {
        Self::new(LEDGER_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current counts by label. A missing file is an empty ledger.
    pub fn read(&self) -> Result<BTreeMap<String, i64>, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(LedgerError::Read { path: self.path.clone(), source }),
        };
        parse_ledger(&content)
    }

    /// Bump `label` (starting at 0) and return the formatted version label.
    pub fn increment(&self, label: &str) -> Result<String, LedgerError> {
        validate_label(label)?;

        let mut versions = self.read()?;
        let next = match versions.get(label) {
            Some(current) => current
                .checked_add(1)
                .ok_or_else(|| LedgerError::Overflow { label: label.to_string() })?,
            None => 0,
        };
        versions.insert(label.to_string(), next);
        self.write(&versions)?;

        let formatted = format_label(label, next);
        tracing::debug!(label, version = next, path = %self.path.display(), "incremented version");
        Ok(formatted)
    }

    fn write(&self, versions: &BTreeMap<String, i64>) -> Result<(), LedgerError> {
        let content: String = versions.iter().map(|(label, count)| format!("{label} {count}\n")).collect();
        fs::write(&self.path, content).map_err(|source| LedgerError::Write { path: self.path.clone(), source })
    }
}

/// Bump `label` in the current directory's ledger.
pub fn increment_version(label: &str) -> Result<String, LedgerError> {
    Ledger::in_current_dir().increment(label)
}

/// `label.N` when the label already ends in a digit, `label_vN` otherwise.
pub fn format_label(label: &str, version: i64) -> String {
    if label.chars().last().is_some_and(|c| c.is_ascii_digit()) {
        format!("{label}.{version}")
    } else {
        format!("{label}_v{version}")
    }
}

fn validate_label(label: &str) -> Result<(), LedgerError> {
    if label.is_empty() || label.chars().any(char::is_whitespace) {
        return Err(LedgerError::InvalidLabel { label: label.to_string() });
    }
    Ok(())
}

/// Blank lines and lines without exactly two fields are ignored.
fn parse_ledger(content: &str) -> Result<BTreeMap<String, i64>, LedgerError> {
    let mut versions = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [label, count] = fields.as_slice() else {
            continue;
        };
        let count = count.parse::<i64>().map_err(|source| LedgerError::InvalidCount {
            line: idx + 1,
            value: (*count).to_string(),
            source,
        })?;
        versions.insert((*label).to_string(), count);
    }
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_label_counts_up_from_zero() {
        let tmp = TempDir::new().expect("tmp");
        let ledger = Ledger::new(tmp.path().join(LEDGER_FILE_NAME));

        assert_eq!(ledger.increment("resnet").expect("first"), "resnet_v0");
        assert_eq!(fs::read_to_string(ledger.path()).expect("read"), "resnet 0\n");

        assert_eq!(ledger.increment("resnet").expect("second"), "resnet_v1");
        assert_eq!(fs::read_to_string(ledger.path()).expect("read"), "resnet 1\n");
    }

    #[test]
    fn test_labels_ending_in_digit_use_dot_suffix() {
        assert_eq!(format_label("gpt2", 3), "gpt2.3");
        assert_eq!(format_label("gpt", 3), "gpt_v3");
    }

    #[test]
    fn test_rewrite_is_sorted_by_label() {
        let tmp = TempDir::new().expect("tmp");
        let ledger = Ledger::new(tmp.path().join("ledger"));

        ledger.increment("zeta").expect("zeta");
        ledger.increment("alpha").expect("alpha");
        ledger.increment("mid").expect("mid");
        ledger.increment("alpha").expect("alpha again");

        assert_eq!(
            fs::read_to_string(ledger.path()).expect("read"),
            "alpha 1\nmid 0\nzeta 0\n"
        );
    }

    #[test]
    fn test_existing_counts_are_continued() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("ledger");
        fs::write(&path, "exp 41\n\nnoise\nother 2\n").expect("write");
        let ledger = Ledger::new(&path);

        assert_eq!(ledger.increment("exp").expect("bump"), "exp_v42");
        assert_eq!(fs::read_to_string(&path).expect("read"), "exp 42\nother 2\n");
    }

    #[test]
    fn test_negative_counts_are_bumped() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("ledger");
        fs::write(&path, "exp -1\nold -5\n").expect("write");
        let ledger = Ledger::new(&path);

        assert_eq!(ledger.increment("exp").expect("exp"), "exp_v0");
        assert_eq!(ledger.increment("old").expect("old"), "old_v-4");
        assert_eq!(fs::read_to_string(&path).expect("read"), "exp 0\nold -4\n");
    }

    #[test]
    fn test_non_numeric_count_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("ledger");
        fs::write(&path, "exp seven\n").expect("write");

        let err = Ledger::new(&path).increment("exp").expect_err("bad count");
        assert!(matches!(err, LedgerError::InvalidCount { line: 1, .. }));
    }

    #[test]
    fn test_labels_that_cannot_round_trip_are_rejected() {
        let tmp = TempDir::new().expect("tmp");
        let ledger = Ledger::new(tmp.path().join("ledger"));

        assert!(matches!(ledger.increment(""), Err(LedgerError::InvalidLabel { .. })));
        assert!(matches!(ledger.increment("two words"), Err(LedgerError::InvalidLabel { .. })));
        assert!(!ledger.path().exists());
    }

    #[test]
    fn test_read_of_missing_ledger_is_empty() {
        let tmp = TempDir::new().expect("tmp");
        assert!(Ledger::new(tmp.path().join("absent")).read().expect("read").is_empty());
    }
}
