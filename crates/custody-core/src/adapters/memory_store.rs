//! # In-Memory World State
//!
//! `RwLock<BTreeMap>` implementation of the [`WorldState`] port for tests
//! and embedding. Scans iterate over a snapshot taken at call time, which
//! matches the host ledger's per-invocation snapshot semantics closely
//! enough for a test double.

use crate::domain::errors::StoreError;
use crate::ports::store::{Selector, StateEntry, StateIter, WorldState};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory implementation of the world state port.
#[derive(Debug, Default)]
pub struct InMemoryWorldState {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryWorldState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<Vec<StateEntry>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .iter()
            .map(|(key, value)| StateEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }
}

impl WorldState for InMemoryWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.insert(key.to_string(), value);
        Ok(())
    }

    fn scan_all(&self) -> Result<StateIter<'_>, StoreError> {
        let entries = self.snapshot()?;
        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn query(&self, selector: &Selector) -> Result<StateIter<'_>, StoreError> {
        // Records that are not JSON documents are simply absent from the
        // index, mirroring how a document store builds selector indexes.
        let entries: Vec<StateEntry> = self
            .snapshot()?
            .into_iter()
            .filter(|entry| {
                serde_json::from_slice::<Value>(&entry.value)
                    .map(|document| selector.matches(&document))
                    .unwrap_or(false)
            })
            .collect();
        Ok(Box::new(entries.into_iter().map(Ok)))
    }
}
