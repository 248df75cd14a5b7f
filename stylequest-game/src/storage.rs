//! Key/value persistence port.
//!
//! Platform crates provide the real backend (browser local storage, a JSON
//! file, ...). [`MemoryStore`] is the in-process implementation used by tests
//! and by callers that do not need durability.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use thiserror::Error;

use crate::error::QuestError;

/// Trait for abstracting string key/value storage.
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (quota, disabled storage).
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("write rejected for key `{key}`")]
    WriteRejected { key: String },
}

/// Shared in-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    failing_prefixes: Rc<RefCell<BTreeSet<String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent write or removal of keys starting with `prefix`.
    pub fn fail_writes_for(&self, prefix: &str) {
        self.failing_prefixes.borrow_mut().insert(prefix.to_string());
    }

    /// Reject all subsequent writes, as a full or disabled storage would.
    pub fn fail_all_writes(&self) {
        self.fail_writes_for("");
    }

    pub fn clear_write_failures(&self) {
        self.failing_prefixes.borrow_mut().clear();
    }

    /// Copy of all entries, ordered by key.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_writable(&self, key: &str) -> Result<(), MemoryStoreError> {
        let rejected = self
            .failing_prefixes
            .borrow()
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()));
        if rejected {
            return Err(MemoryStoreError::WriteRejected {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.check_writable(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.check_writable(key)?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read a raw value, treating backend failures as absence.
pub(crate) fn read_raw<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("storage read of `{key}` failed, treating as empty: {err}");
            None
        }
    }
}

/// Read and decode a JSON value. Missing, unreadable, or corrupt entries
/// all come back as `None`.
pub(crate) fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let raw = read_raw(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("stored `{key}` is not valid JSON, ignoring it: {err}");
            None
        }
    }
}

pub(crate) fn encode_json<T: Serialize>(key: &str, value: &T) -> Result<String, QuestError> {
    serde_json::to_string(value).map_err(|source| QuestError::Encode {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn write_raw<S: KeyValueStore>(
    store: &S,
    key: &str,
    value: &str,
) -> Result<(), QuestError> {
    store
        .set(key, value)
        .map_err(|err| QuestError::StorageWrite {
            key: key.to_string(),
            source: Box::new(err),
        })
}

pub(crate) fn remove_key<S: KeyValueStore>(store: &S, key: &str) -> Result<(), QuestError> {
    store.remove(key).map_err(|err| QuestError::StorageWrite {
        key: key.to_string(),
        source: Box::new(err),
    })
}

/// Records the prior value of every key it writes so a multi-key update can
/// be undone when a later write fails.
pub(crate) struct WriteJournal<'s, S: KeyValueStore> {
    store: &'s S,
    previous: Vec<(String, Option<String>)>,
}

impl<'s, S: KeyValueStore> WriteJournal<'s, S> {
    pub(crate) const fn new(store: &'s S) -> Self {
        Self {
            store,
            previous: Vec::new(),
        }
    }

    pub(crate) fn write(&mut self, key: &str, value: &str) -> Result<(), QuestError> {
        if !self.previous.iter().any(|(seen, _)| seen == key) {
            let prior = read_raw(self.store, key);
            self.previous.push((key.to_string(), prior));
        }
        write_raw(self.store, key, value)
    }

    /// Restore every journaled key, newest first. Failures are logged; there
    /// is nothing more a caller could do with them.
    pub(crate) fn rollback(self) {
        for (key, prior) in self.previous.into_iter().rev() {
            let restored = match prior {
                Some(value) => self.store.set(&key, &value),
                None => self.store.remove(&key),
            };
            if let Err(err) = restored {
                log::warn!("could not restore `{key}` after a failed update: {err}");
            }
        }
    }
}
