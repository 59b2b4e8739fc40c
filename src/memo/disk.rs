//! On-disk layer: one bincode file per cache key

use super::CacheError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Upper bound on a decoded payload, so a corrupted length prefix is a miss
/// instead of a huge allocation.
pub const PAYLOAD_LIMIT_BYTES: u64 = 1024 * 1024 * 1024;

/// Fixed-width little-endian encoding that rejects trailing bytes.
pub(crate) fn bincode_options() -> impl Options + Copy {
    bincode::DefaultOptions::new().with_fixint_encoding().with_little_endian()
}

/// Return the value stored at `path`, or run `producer` and persist its result.
///
/// A missing file and a file that does not decode are both cache misses.
/// Persisting is best-effort: a value that fails to serialize is still
/// returned, and nothing is written. Other read errors propagate.
pub fn memoize_to_disk<T, F>(path: impl AsRef<Path>, producer: F, verbose: bool) -> Result<T, CacheError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let path = path.as_ref();
    if verbose {
        tracing::info!("memoize: looking for cache file {}", path.display());
    }

    if let Some(value) = load(path, verbose)? {
        return Ok(value);
    }

    if verbose {
        tracing::info!("memoize: {} missing or unreadable, computing it", path.display());
    }
    let value = producer();
    store(path, &value, verbose)?;
    Ok(value)
}

/// `Ok(None)` on a miss (absent or undecodable file).
pub fn load<T: DeserializeOwned>(path: &Path, verbose: bool) -> Result<Option<T>, CacheError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(CacheError::Read { path: path.to_path_buf(), source }),
    };

    match bincode_options().with_limit(PAYLOAD_LIMIT_BYTES).deserialize(&bytes) {
        Ok(value) => {
            if verbose {
                tracing::info!("memoize: loaded {}", path.display());
            }
            Ok(Some(value))
        }
        Err(err) => {
            if verbose {
                tracing::warn!("memoize: {} is corrupted: {}", path.display(), err);
            } else {
                tracing::debug!("memoize: {} is corrupted: {}", path.display(), err);
            }
            Ok(None)
        }
    }
}

/// Returns whether a file was written. Serialization failures are logged and
/// reported as `Ok(false)`; write failures propagate.
pub fn store<T: Serialize>(path: &Path, value: &T, verbose: bool) -> Result<bool, CacheError> {
    let bytes = match bincode_options().serialize(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            if verbose {
                tracing::warn!("memoize: couldn't serialize value for {}: {}", path.display(), err);
            } else {
                tracing::debug!("memoize: couldn't serialize value for {}: {}", path.display(), err);
            }
            return Ok(false);
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| CacheError::Write { path: path.to_path_buf(), source })?;
    }
    fs::write(path, &bytes).map_err(|source| CacheError::Write { path: path.to_path_buf(), source })?;

    if verbose {
        tracing::info!("memoize: wrote {} ({} bytes)", path.display(), bytes.len());
    }
    Ok(true)
}
