//! # Domain Entities
//!
//! Product and Container document shapes as persisted in the world state.
//!
//! ## Persisted Layout
//!
//! Each entity is a single JSON document keyed by its id, in a flat key
//! space shared with document types written by other parties. The `docType`
//! field is the discriminator; the serde renames below pin the wire names
//! (`docType`, `containerID`) so the selector index keeps working against
//! records written by any party.

use crate::domain::errors::CustodyError;
use serde::{Deserialize, Serialize};

/// Discriminator value for Product documents.
pub const PRODUCT_DOC_TYPE: &str = "product";

/// Discriminator value for Container documents.
pub const CONTAINER_DOC_TYPE: &str = "container";

/// A unit of tracked goods.
///
/// ## Invariants
///
/// - `id` is immutable once created; the store rejects re-creation
/// - `container_id` is non-empty iff the product is a declared member of
///   that container (the container is the aggregation root)
/// - `custodian` changes through direct transfer only while ungrouped
/// - `participants` is append-only and always contains the creator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub name: String,
    /// Free-form status string.
    pub health: String,
    pub metadata: String,
    pub location: String,
    pub sold: bool,
    pub recalled: bool,
    #[serde(rename = "containerID")]
    pub container_id: String,
    /// Subject currently in physical possession.
    pub custodian: String,
    /// Unix seconds of the last custody or state change.
    pub timestamp: i64,
    /// Every subject ever granted visibility, creator first.
    pub participants: Vec<String>,
}

impl Product {
    /// Build a fresh product record from a creation request.
    ///
    /// The creator becomes the initial custodian and is always recorded as
    /// a participant, whether or not the request listed them.
    pub fn from_request(request: CreateProductRequest, creator: &str, now: i64) -> Self {
        let mut product = Self {
            id: request.id,
            doc_type: PRODUCT_DOC_TYPE.to_string(),
            name: request.product_name,
            health: String::new(),
            metadata: request.metadata,
            location: request.location,
            sold: false,
            recalled: false,
            container_id: String::new(),
            custodian: creator.to_string(),
            timestamp: now,
            participants: Vec::new(),
        };
        for participant in request.participants {
            product.grant_participant(participant);
        }
        product.grant_participant(creator.to_string());
        product
    }

    /// True while the product is a declared member of a container.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        !self.container_id.is_empty()
    }

    /// Append a subject to the participant list.
    ///
    /// This is the only way visibility is granted; participants are never
    /// removed or overwritten.
    pub fn grant_participant(&mut self, subject: String) {
        if !self.participants.contains(&subject) {
            self.participants.push(subject);
        }
    }

    /// Strict interpretation of a stored record as a Product.
    ///
    /// Fails with `InvalidRecord` on malformed JSON or a foreign document
    /// shape at this key.
    pub fn parse(key: &str, bytes: &[u8]) -> Result<Self, CustodyError> {
        let product: Self =
            serde_json::from_slice(bytes).map_err(|e| CustodyError::InvalidRecord {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        if product.doc_type != PRODUCT_DOC_TYPE {
            return Err(CustodyError::InvalidRecord {
                key: key.to_string(),
                reason: format!("document is a {:?}, not a product", product.doc_type),
            });
        }
        Ok(product)
    }
}

/// An aggregation of products moving together.
///
/// The container's custodian is authoritative over the custody of every
/// member product; members cannot have their custodian changed directly
/// while grouped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    #[serde(rename = "docType")]
    pub doc_type: String,
    /// Subject in physical possession of the whole container.
    pub custodian: String,
    /// Unix seconds of the last custody or membership change.
    pub timestamp: i64,
    /// Every subject ever granted visibility, creator first.
    pub participants: Vec<String>,
    /// Ids of the member products.
    pub contents: Vec<String>,
}

impl Container {
    /// Build a fresh container record from a creation request.
    pub fn from_request(request: CreateContainerRequest, creator: &str, now: i64) -> Self {
        let mut container = Self {
            id: request.id,
            doc_type: CONTAINER_DOC_TYPE.to_string(),
            custodian: creator.to_string(),
            timestamp: now,
            participants: Vec::new(),
            contents: Vec::new(),
        };
        for participant in request.participants {
            container.grant_participant(participant);
        }
        container.grant_participant(creator.to_string());
        container
    }

    /// Append a subject to the participant list, never removing any.
    pub fn grant_participant(&mut self, subject: String) {
        if !self.participants.contains(&subject) {
            self.participants.push(subject);
        }
    }

    /// True if the product id is a declared member.
    #[must_use]
    pub fn holds(&self, product_id: &str) -> bool {
        self.contents.iter().any(|id| id == product_id)
    }

    /// Strict interpretation of a stored record as a Container.
    pub fn parse(key: &str, bytes: &[u8]) -> Result<Self, CustodyError> {
        let container: Self =
            serde_json::from_slice(bytes).map_err(|e| CustodyError::InvalidRecord {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        if container.doc_type != CONTAINER_DOC_TYPE {
            return Err(CustodyError::InvalidRecord {
                key: key.to_string(),
                reason: format!("document is a {:?}, not a container", container.doc_type),
            });
        }
        Ok(container)
    }
}

/// Creation request for a product, arriving as caller-supplied JSON.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateProductRequest {
    pub id: String,
    #[serde(rename = "productName")]
    pub product_name: String,
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Creation request for a container.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateContainerRequest {
    pub id: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl CreateProductRequest {
    /// Reject requests that cannot name a record.
    pub fn validate(&self) -> Result<(), CustodyError> {
        if self.id.is_empty() {
            return Err(CustodyError::InvalidRequest(
                "product id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl CreateContainerRequest {
    pub fn validate(&self) -> Result<(), CustodyError> {
        if self.id.is_empty() {
            return Err(CustodyError::InvalidRequest(
                "container id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateProductRequest {
        CreateProductRequest {
            id: "P1".to_string(),
            product_name: "sampleproduct".to_string(),
            metadata: "misc".to_string(),
            location: "india".to_string(),
            participants: vec!["alice".to_string(), "bob".to_string()],
        }
    }

    #[test]
    fn test_creation_records_creator_as_participant_and_custodian() {
        let product = Product::from_request(request(), "alice", 1_532_009_163);

        assert_eq!(product.custodian, "alice");
        assert_eq!(product.participants, vec!["alice", "bob"]);
        assert!(!product.sold);
        assert!(!product.recalled);
        assert!(!product.is_grouped());
    }

    #[test]
    fn test_creation_appends_unlisted_creator() {
        let mut req = request();
        req.participants = vec!["bob".to_string()];
        let product = Product::from_request(req, "alice", 0);

        assert_eq!(product.participants, vec!["bob", "alice"]);
    }

    #[test]
    fn test_grant_participant_is_append_only() {
        let mut product = Product::from_request(request(), "alice", 0);
        product.grant_participant("carrier1".to_string());
        product.grant_participant("alice".to_string());

        assert_eq!(product.participants, vec!["alice", "bob", "carrier1"]);
    }

    #[test]
    fn test_wire_field_names_are_pinned() {
        let product = Product::from_request(request(), "alice", 7);
        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(value["docType"], "product");
        assert_eq!(value["containerID"], "");
        assert_eq!(value["timestamp"], 7);
    }

    #[test]
    fn test_parse_rejects_foreign_document() {
        let container = Container::from_request(
            CreateContainerRequest {
                id: "C1".to_string(),
                participants: vec![],
            },
            "carrier1",
            0,
        );
        let bytes = serde_json::to_vec(&container).unwrap();

        let err = Product::parse("C1", &bytes).unwrap_err();
        assert!(matches!(err, CustodyError::InvalidRecord { .. }));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = Product::parse("P1", b"{not json").unwrap_err();
        assert!(matches!(err, CustodyError::InvalidRecord { .. }));
    }
}
