//! # Access Control Engine
//!
//! A record is visible to a caller iff the caller's subject is present in
//! the record's participant list. The same predicate gates single reads,
//! listings, and every mutation, and a failed check is always surfaced as
//! `NotFound`, never `Forbidden`, so existence cannot leak through the
//! error channel.

use crate::domain::entities::{Container, Product};
use crate::domain::identity::Identity;

/// Visibility predicate shared by every participant-scoped document.
pub trait Accessible {
    fn participants(&self) -> &[String];

    /// Membership test, not ordering-sensitive.
    fn accessible_by(&self, identity: &Identity) -> bool {
        self.participants()
            .iter()
            .any(|participant| participant == identity.subject())
    }
}

impl Accessible for Product {
    fn participants(&self) -> &[String] {
        &self.participants
    }
}

impl Accessible for Container {
    fn participants(&self) -> &[String] {
        &self.participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CreateProductRequest;

    fn product(participants: &[&str]) -> Product {
        Product::from_request(
            CreateProductRequest {
                id: "P1".to_string(),
                product_name: "widget".to_string(),
                metadata: String::new(),
                location: String::new(),
                participants: participants.iter().map(|s| s.to_string()).collect(),
            },
            participants[0],
            0,
        )
    }

    #[test]
    fn test_participant_sees_record() {
        let p = product(&["alice", "bob"]);
        assert!(p.accessible_by(&Identity::unrestricted("alice")));
        assert!(p.accessible_by(&Identity::unrestricted("bob")));
    }

    #[test]
    fn test_outsider_does_not_see_record() {
        let p = product(&["alice"]);
        assert!(!p.accessible_by(&Identity::unrestricted("mallory")));
    }

    #[test]
    fn test_membership_ignores_ordering() {
        let p = product(&["bob", "alice"]);
        assert!(p.accessible_by(&Identity::unrestricted("alice")));
    }
}
