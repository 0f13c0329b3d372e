//! # Error Types
//!
//! Failure taxonomy for the custody core, with the mapping onto the
//! HTTP-style wire statuses the host envelope carries.
//!
//! Inaccessible records are deliberately reported as `NotFound`: a caller
//! must never be able to distinguish "absent" from "exists but not yours"
//! through the error channel.

use std::fmt;
use thiserror::Error;

/// Entity kind tag for error messages and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocKind {
    Product,
    Container,
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocKind::Product => f.write_str("product"),
            DocKind::Container => f.write_str("container"),
        }
    }
}

/// Errors surfaced by the world state port.
///
/// Treated as fatal for the invocation and propagated unmodified; retry
/// policy belongs to the host ledger, never to the core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("iteration failed: {0}")]
    IterationFailed(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Operation failures of the custody core.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// The id is absent, or present but not accessible to the caller.
    #[error("{kind} {id} not found")]
    NotFound { kind: DocKind, id: String },

    /// Coarse capability gate failed before any entity state was read.
    #[error("not authorized to perform this transaction, cannot invoke {operation}")]
    NotAuthorized { operation: String },

    /// Creation against an id that is already taken.
    #[error("existing {kind} {id} found")]
    AlreadyExists { kind: DocKind, id: String },

    /// No-op custody transfer, rejected so callers detect stale reads.
    #[error("already custodian of {id}")]
    AlreadyCustodian { id: String },

    /// Grouped product whose container has not changed hands to the caller.
    #[error("product {id} must be unpackaged before claiming a new custodian")]
    StillGrouped { id: String },

    /// Packaging a product that is already a member of a container.
    #[error("product {id} is already packaged into container {container_id}")]
    AlreadyGrouped { id: String, container_id: String },

    /// Unpackaging a product that is not a member of any container.
    #[error("product {id} is not packaged into a container")]
    NotGrouped { id: String },

    /// Grouping operations require physical possession.
    #[error("{subject} is not custodian of {kind} {id}")]
    NotCustodian {
        subject: String,
        kind: DocKind,
        id: String,
    },

    /// Malformed caller input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A stored record could not be interpreted as the expected shape.
    #[error("invalid record at key {key}: {reason}")]
    InvalidRecord { key: String, reason: String },

    /// A listing grew past the configured cap. Partial lists are never
    /// returned, so the whole operation fails.
    #[error("listing exceeded the configured cap of {limit} records")]
    ListingOverflow { limit: usize },

    /// The underlying store itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CustodyError {
    /// HTTP-style wire status for the host response envelope.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            CustodyError::NotFound { .. } => 404,
            CustodyError::NotAuthorized { .. }
            | CustodyError::AlreadyExists { .. }
            | CustodyError::AlreadyCustodian { .. }
            | CustodyError::StillGrouped { .. }
            | CustodyError::AlreadyGrouped { .. }
            | CustodyError::NotGrouped { .. }
            | CustodyError::NotCustodian { .. } => 403,
            CustodyError::InvalidRequest(_) | CustodyError::InvalidRecord { .. } => 400,
            CustodyError::ListingOverflow { .. } | CustodyError::Store(_) => 500,
        }
    }

    /// Shorthand used on every access-masking path.
    #[must_use]
    pub fn not_found(kind: DocKind, id: &str) -> Self {
        CustodyError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
