//! Key-value capability consumed by the todo handlers.
//!
//! Handlers only ever see a [`KeyValueStore`] handed to them by the host. This crate defines
//! that capability and ships two stores a host can inject: the in-memory [`KeyValue`] and the
//! directory-backed [`FsKeyValue`].

use std::path::PathBuf;
use std::sync::Arc;

mod fs;
mod mem;

pub use fs::FsKeyValue;
pub use mem::KeyValue;

pub type Result<T, E = StoreError> = core::result::Result<T, E>;

/// Errors surfaced by a [`KeyValueStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No value is stored under the key
    #[error("no value stored under key `{0}`")]
    NotFound(String),
    /// The key cannot be represented by the store
    #[error("invalid key `{0}`")]
    InvalidKey(String),
    /// Underlying I/O failed
    #[error("I/O failure on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
    #[error("{0}")]
    Other(String),
}

/// A single bucket of the host key-value capability.
///
/// Implementations must make `get` and `set` atomic per key and must return a consistent
/// snapshot from `keys`. Nothing beyond single-key atomicity is promised.
pub trait KeyValueStore {
    /// Returns the bytes stored under `key`, or `None` if the key is unknown
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns every key currently stored
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}
