//! # Query/Listing Engine
//!
//! Accessibility-filtered collection of raw product records from store
//! iterators. Records are returned exactly as stored, never re-serialized,
//! so fields this crate does not model survive a listing.
//!
//! A listing either completes or fails as a whole: a store error or a
//! syntactically corrupt record aborts the scan rather than producing a
//! partial view callers might silently trust.

use crate::domain::access::Accessible;
use crate::domain::entities::{Product, PRODUCT_DOC_TYPE};
use crate::domain::errors::{CustodyError, StoreError};
use crate::domain::identity::Identity;
use crate::ports::store::StateEntry;
use serde_json::Value;

enum Interpretation {
    Product(Product),
    /// Valid JSON of some other document shape sharing the key space.
    Foreign,
    Corrupt(String),
}

fn interpret(value: &[u8]) -> Interpretation {
    let document: Value = match serde_json::from_slice(value) {
        Ok(document) => document,
        Err(e) => return Interpretation::Corrupt(e.to_string()),
    };
    if document.get("docType").and_then(Value::as_str) != Some(PRODUCT_DOC_TYPE) {
        return Interpretation::Foreign;
    }
    match serde_json::from_value(document) {
        Ok(product) => Interpretation::Product(product),
        Err(e) => Interpretation::Corrupt(e.to_string()),
    }
}

/// Collect raw records visible to `identity` from a full-range scan.
///
/// The key space holds other document shapes, so foreign documents are
/// skipped, not fatal. Corrupt records and store errors abort the listing.
pub fn collect_accessible_products(
    entries: impl Iterator<Item = Result<StateEntry, StoreError>>,
    identity: &Identity,
    limit: usize,
) -> Result<Vec<Vec<u8>>, CustodyError> {
    collect(entries, identity, limit, true)
}

/// Collect raw records visible to `identity` from a selector query.
///
/// The selector already constrained the document type, so every record is
/// expected to be a product; anything else is a corrupt index and aborts.
pub fn collect_selected_products(
    entries: impl Iterator<Item = Result<StateEntry, StoreError>>,
    identity: &Identity,
    limit: usize,
) -> Result<Vec<Vec<u8>>, CustodyError> {
    collect(entries, identity, limit, false)
}

fn collect(
    entries: impl Iterator<Item = Result<StateEntry, StoreError>>,
    identity: &Identity,
    limit: usize,
    skip_foreign: bool,
) -> Result<Vec<Vec<u8>>, CustodyError> {
    let mut records = Vec::new();
    for entry in entries {
        let StateEntry { key, value } = entry?;
        match interpret(&value) {
            Interpretation::Product(product) => {
                if product.accessible_by(identity) {
                    if records.len() == limit {
                        return Err(CustodyError::ListingOverflow { limit });
                    }
                    records.push(value);
                }
            }
            Interpretation::Foreign if skip_foreign => {}
            Interpretation::Foreign => {
                return Err(CustodyError::InvalidRecord {
                    key,
                    reason: "selector returned a non-product document".to_string(),
                })
            }
            Interpretation::Corrupt(reason) => {
                return Err(CustodyError::InvalidRecord { key, reason })
            }
        }
    }
    Ok(records)
}
