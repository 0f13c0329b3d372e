//! # World State Port
//!
//! Abstraction over the host ledger's key-value world state. The host
//! guarantees that all reads within one invocation reflect a consistent
//! snapshot and that writes become visible only after the transaction
//! commits; this port only exposes reads, terminal writes, and iteration.

use crate::domain::errors::StoreError;
use serde_json::Value;

/// One record yielded by a range scan or selector query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub value: Vec<u8>,
}

/// Owned scan cursor. Dropping it releases the underlying range-scan
/// resources on every exit path, including error paths.
pub type StateIter<'a> = Box<dyn Iterator<Item = Result<StateEntry, StoreError>> + 'a>;

/// Equality-match selector over stored JSON documents, mirroring the
/// host's indexed query interface: a mandatory document type plus field
/// equality constraints.
#[derive(Clone, Debug)]
pub struct Selector {
    doc_type: String,
    fields: Vec<(String, Value)>,
}

impl Selector {
    #[must_use]
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            fields: Vec::new(),
        }
    }

    /// Add an equality constraint on a top-level document field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// True iff the document carries the selected type and every
    /// constrained field matches exactly.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        if document.get("docType").and_then(Value::as_str) != Some(self.doc_type.as_str()) {
            return false;
        }
        self.fields
            .iter()
            .all(|(name, expected)| document.get(name) == Some(expected))
    }
}

/// World state port.
///
/// Implementations must not retry internally; failures are surfaced
/// unmodified and end the invocation.
pub trait WorldState: Send + Sync {
    /// Point lookup. `None` means no record at the key.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Overwrite the full record at the key.
    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Full-range scan over every key in the namespace. Iteration order is
    /// not guaranteed stable across calls.
    fn scan_all(&self) -> Result<StateIter<'_>, StoreError>;

    /// Indexed selector query over stored JSON documents.
    fn query(&self, selector: &Selector) -> Result<StateIter<'_>, StoreError>;
}
