use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tracing::instrument;

use crate::{KeyValueStore, Result, StoreError};

type Bucket = BTreeMap<String, Vec<u8>>;

/// In-memory [`KeyValueStore`] implementation
///
/// Keys are kept ordered, so [`KeyValueStore::keys`] lists them sorted.
#[derive(Debug, Default)]
pub struct KeyValue(RwLock<Bucket>);

impl KeyValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, Vec<u8>)> for KeyValue {
    fn from_iter<T: IntoIterator<Item = (String, Vec<u8>)>>(iter: T) -> Self {
        Self(RwLock::new(iter.into_iter().collect()))
    }
}

impl From<KeyValue> for Bucket {
    fn from(KeyValue(bucket): KeyValue) -> Self {
        bucket
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for KeyValue {
    #[instrument(level = "trace", skip(self))]
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let bucket = self.0.read().map_err(|_| StoreError::Poisoned)?;
        Ok(bucket.get(key).cloned())
    }

    #[instrument(level = "trace", skip(self, value), fields(len = value.len()))]
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut bucket = self.0.write().map_err(|_| StoreError::Poisoned)?;
        bucket.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    fn keys(&self) -> Result<Vec<String>> {
        let bucket = self.0.read().map_err(|_| StoreError::Poisoned)?;
        Ok(bucket.keys().cloned().collect())
    }
}
