//! Test doubles for the key-value capability

use std::sync::{Arc, Mutex, PoisonError};

use wasmcloud_todo_keyvalue::{KeyValueStore, Result, StoreError};

/// A capability call observed by a [`RecordingStore`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Get { key: String },
    Set { key: String, value: Vec<u8> },
    Keys,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Set { .. })
    }
}

/// Wraps a store and records every call made through it.
///
/// Clones share both the wrapped store and the recorded calls, so a test can hand one clone to
/// the handler and inspect the other.
#[derive(Debug)]
pub struct RecordingStore<S> {
    inner: Arc<S>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl<S> Clone for RecordingStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: Arc::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls that modify the store
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_mutation)
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl<S: KeyValueStore> KeyValueStore for RecordingStore<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.record(Call::Get { key: key.into() });
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.record(Call::Set {
            key: key.into(),
            value: value.to_vec(),
        });
        self.inner.set(key, value)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.record(Call::Keys);
        self.inner.keys()
    }
}

/// A store whose every operation fails
#[derive(Clone, Debug, Default)]
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Other("store unavailable".into())
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(unavailable())
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
        Err(unavailable())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Err(unavailable())
    }
}
