//! # Caller Identity
//!
//! Identity is an opaque value resolved by the host once per invocation:
//! a stable subject string plus a capability check delegated to policy
//! outside the core. It is an explicit parameter on every operation, never
//! ambient state, so access control stays testable without a host.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Policy seam deciding whether a subject may attempt a class of operation
/// at all (e.g. only manufacturers create products). Checked before any
/// entity state is inspected; entity-level visibility is separate.
pub trait InvokePolicy: Send + Sync {
    fn allows(&self, subject: &str, operation: &str) -> bool;
}

/// Policy that permits everything, for hosts that gate invocations upstream.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl InvokePolicy for AllowAll {
    fn allows(&self, _subject: &str, _operation: &str) -> bool {
        true
    }
}

/// Static subject-to-operation grant table, for embedded hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticPolicy {
    grants: BTreeMap<String, BTreeSet<String>>,
}

impl StaticPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `subject` the right to attempt `operation`.
    #[must_use]
    pub fn grant(mut self, subject: &str, operation: &str) -> Self {
        self.grants
            .entry(subject.to_string())
            .or_default()
            .insert(operation.to_string());
        self
    }
}

impl InvokePolicy for StaticPolicy {
    fn allows(&self, subject: &str, operation: &str) -> bool {
        self.grants
            .get(subject)
            .is_some_and(|ops| ops.contains(operation))
    }
}

/// Resolved caller identity. Constructed once per invocation, never
/// persisted.
#[derive(Clone)]
pub struct Identity {
    subject: String,
    policy: Arc<dyn InvokePolicy>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, policy: Arc<dyn InvokePolicy>) -> Self {
        Self {
            subject: subject.into(),
            policy,
        }
    }

    /// Identity with an allow-all capability, for tests and trusted hosts.
    pub fn unrestricted(subject: impl Into<String>) -> Self {
        Self::new(subject, Arc::new(AllowAll))
    }

    /// Stable subject string derived from the caller's certificate identity.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Coarse capability check, delegated to the host policy.
    #[must_use]
    pub fn can_invoke(&self, operation: &str) -> bool {
        self.policy.allows(&self.subject, operation)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}
