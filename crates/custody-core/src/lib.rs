//! # custody-core
//!
//! Access-scoped custody tracking for goods moving through a multi-party
//! supply chain.
//!
//! ## Role in System
//!
//! - **Entity Model**: Product and Container documents stored as JSON in a
//!   host-provided world state
//! - **Access Control Engine**: participant-based visibility, with
//!   inaccessible records reported exactly like absent ones
//! - **Custody Transfer State Machine**: forward-only custody changes,
//!   grouped products locked to their container's custodian
//! - **Query/Listing Engine**: full scans and selector queries filtered by
//!   the access rule
//!
//! ## Host Contract
//!
//! The replicated ledger underneath provides snapshot-consistent reads,
//! commit ordering, and conflict detection. Every operation here runs to
//! completion against one snapshot, performs its validation without side
//! effects, and issues at most one terminal write per record, so the host's
//! optimistic-concurrency replay is safe.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::*;
