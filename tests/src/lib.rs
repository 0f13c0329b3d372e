//! # Custody-Ledger Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # End-to-end flows through the contract surface
//!     └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p custody-tests
//!
//! # By category
//! cargo test -p custody-tests integration::
//! ```

pub mod integration;
