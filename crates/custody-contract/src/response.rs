//! # Response Envelope
//!
//! Structured invocation result layered on the host's own success/error
//! envelope: an HTTP-style numeric status plus either a payload or a
//! human-readable message. No operation ever returns an ambiguous
//! "success with empty payload" for an error case.

use custody_core::domain::errors::CustodyError;

/// Wire statuses used by the contract surface.
pub mod status {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL: u16 = 500;
}

/// Invocation result handed back to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractResponse {
    pub status: u16,
    /// Present exactly when the invocation succeeded.
    pub payload: Option<Vec<u8>>,
    /// Present exactly when the invocation failed.
    pub message: Option<String>,
}

impl ContractResponse {
    #[must_use]
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: status::OK,
            payload: Some(payload),
            message: None,
        }
    }

    #[must_use]
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            payload: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == status::OK
    }
}

impl From<CustodyError> for ContractResponse {
    fn from(err: CustodyError) -> Self {
        ContractResponse::error(err.status(), err.to_string())
    }
}

/// Assemble raw stored records into a JSON array without re-serializing
/// them, so listings preserve fields the core does not model.
#[must_use]
pub fn join_records(records: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = records.iter().map(|r| r.len() + 1).sum();
    let mut buffer = Vec::with_capacity(total + 2);
    buffer.push(b'[');
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            buffer.push(b',');
        }
        buffer.extend_from_slice(record);
    }
    buffer.push(b']');
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_core::domain::errors::DocKind;

    #[test]
    fn test_success_and_error_shapes_are_disjoint() {
        let ok = ContractResponse::success(b"P1".to_vec());
        assert!(ok.is_success());
        assert!(ok.message.is_none());

        let err = ContractResponse::error(status::NOT_FOUND, "product P1 not found");
        assert!(!err.is_success());
        assert!(err.payload.is_none());
    }

    #[test]
    fn test_custody_error_maps_to_status() {
        let response: ContractResponse =
            CustodyError::not_found(DocKind::Product, "P1").into();
        assert_eq!(response.status, status::NOT_FOUND);
        assert_eq!(response.message.as_deref(), Some("product P1 not found"));
    }

    #[test]
    fn test_join_records_is_valid_json() {
        let records = vec![br#"{"id":"P1"}"#.to_vec(), br#"{"id":"P2"}"#.to_vec()];
        let array = join_records(&records);
        let parsed: serde_json::Value = serde_json::from_slice(&array).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);

        assert_eq!(join_records(&[]), b"[]".to_vec());
    }
}
