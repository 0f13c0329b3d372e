//! # Identity Resolution
//!
//! The host transport authenticates callers (certificate validation is its
//! problem, not ours) and hands over an opaque invocation context. The
//! resolver turns that context into the core's [`Identity`] value exactly
//! once per invocation.

use custody_core::domain::identity::{Identity, InvokePolicy};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Context attribute carrying the authenticated caller subject.
pub const SUBJECT_ATTRIBUTE: &str = "subject";

/// Opaque per-invocation context handed in by the host transport.
#[derive(Clone, Debug, Default)]
pub struct InvocationContext {
    attributes: BTreeMap<String, String>,
}

impl InvocationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Context for a caller authenticated as `subject`.
    #[must_use]
    pub fn for_subject(subject: impl Into<String>) -> Self {
        Self::new().with_attribute(SUBJECT_ATTRIBUTE, subject)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The transport did not authenticate the caller; a host
    /// misconfiguration, not a caller error.
    #[error("invoker identity missing from invocation context")]
    MissingIdentity,
}

/// Port producing the caller identity for one invocation.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, ctx: &InvocationContext) -> Result<Identity, IdentityError>;
}

/// Resolver reading the subject straight from a context attribute and
/// attaching a shared invoke policy. Stands in for certificate-based
/// resolution in embedded hosts and tests.
pub struct SubjectAttributeResolver {
    policy: Arc<dyn InvokePolicy>,
}

impl SubjectAttributeResolver {
    pub fn new(policy: Arc<dyn InvokePolicy>) -> Self {
        Self { policy }
    }
}

impl IdentityResolver for SubjectAttributeResolver {
    fn resolve(&self, ctx: &InvocationContext) -> Result<Identity, IdentityError> {
        let subject = ctx
            .attribute(SUBJECT_ATTRIBUTE)
            .ok_or(IdentityError::MissingIdentity)?;
        Ok(Identity::new(subject, Arc::clone(&self.policy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_core::domain::identity::AllowAll;

    #[test]
    fn test_resolves_subject_from_context() {
        let resolver = SubjectAttributeResolver::new(Arc::new(AllowAll));
        let identity = resolver
            .resolve(&InvocationContext::for_subject("alice"))
            .unwrap();
        assert_eq!(identity.subject(), "alice");
    }

    #[test]
    fn test_missing_subject_is_an_error() {
        let resolver = SubjectAttributeResolver::new(Arc::new(AllowAll));
        let err = resolver.resolve(&InvocationContext::new()).unwrap_err();
        assert!(matches!(err, IdentityError::MissingIdentity));
    }
}
