//! Disk-backed memoization with an in-process layer
//!
//! [`Memo`] resolves each `(cache key, producer, verbose)` combination at most
//! once per instance: the first call goes through [`memoize_to_disk`], later
//! calls hand back the same `Arc` without touching the filesystem.
//!
//! Producers are identified by their type, so every closure expression (or fn
//! item) is its own producer. Calling through the same closure expression, for
//! example inside a helper function or a loop, hits the in-memory layer.

pub mod disk;

pub use disk::memoize_to_disk;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache file {}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write cache file {}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    path: PathBuf,
    producer: TypeId,
    verbose: bool,
}

/// In-memory memo table layered over the disk cache. Entries are never
/// evicted; drop or [`clear`](Memo::clear) the instance to release them.
#[derive(Default)]
pub struct Memo {
    entries: HashMap<MemoKey, Arc<dyn Any + Send + Sync>>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `cache_key`, from memory, then disk, then `producer`.
    pub fn get_or_create<T, F>(
        &mut self,
        cache_key: impl AsRef<Path>,
        producer: F,
        verbose: bool,
    ) -> Result<Arc<T>, CacheError>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: FnOnce() -> T + 'static,
    {
        let key = MemoKey {
            path: cache_key.as_ref().to_path_buf(),
            producer: TypeId::of::<F>(),
            verbose,
        };

        if let Some(hit) = self.entries.get(&key) {
            if let Ok(value) = Arc::clone(hit).downcast::<T>() {
                tracing::trace!("memo hit for {}", key.path.display());
                return Ok(value);
            }
        }

        let value = Arc::new(memoize_to_disk(&key.path, producer, verbose)?);
        let erased: Arc<dyn Any + Send + Sync> = value.clone();
        self.entries.insert(key, erased);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for Memo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo").field("entries", &self.entries.len()).finish()
    }
}
