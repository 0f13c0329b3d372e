//! # custody-contract
//!
//! The operation surface of the custody core: invocations arrive by name
//! with a sequence of string arguments and return a structured response
//! carrying an HTTP-style numeric status plus a payload or message.
//!
//! ## Role in System
//!
//! - **Identity Resolution**: turns the host invocation context into the
//!   core's `Identity` value, once per invocation
//! - **Dispatch**: routes operation names to core operations, validating
//!   argument counts and parsing JSON request bodies
//! - **Response Envelope**: maps typed core failures onto wire statuses
//!   (200 / 400 / 403 / 404 / 500)
//!
//! Transport and RPC plumbing stay with the host; this crate is invoked as
//! a plain synchronous function.

pub mod contract;
pub mod identity;
pub mod response;

pub use contract::*;
pub use identity::*;
pub use response::*;
