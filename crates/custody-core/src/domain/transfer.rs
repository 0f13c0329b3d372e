//! # Custody Transfer State Machine
//!
//! Pure validation and application of custody changes. Nothing here
//! touches the store: the service resolves the records first and persists
//! the results after, so the whole validation path is deterministic and
//! side-effect-free and the host ledger can safely replay it under
//! optimistic concurrency.
//!
//! ## Container Lock
//!
//! Physical custody of a container implies custody of everything inside
//! it. A grouped product's custody can only be "caught up" to match its
//! container's current custodian, never diverge from it, so a caller can
//! never claim a product out from under a container they do not possess.

use crate::domain::access::Accessible;
use crate::domain::entities::{Container, Product};
use crate::domain::errors::{CustodyError, DocKind};
use crate::domain::identity::Identity;

/// Direct product custody transfer.
///
/// Precondition chain, in order: requester must see the record (masked as
/// `NotFound`), a no-op transfer is rejected, and a grouped product is
/// locked to its container's custodian.
pub fn transfer_product(
    mut product: Product,
    container: Option<&Container>,
    requester: &Identity,
    new_location: &str,
    now: i64,
) -> Result<Product, CustodyError> {
    if !product.accessible_by(requester) {
        return Err(CustodyError::not_found(DocKind::Product, &product.id));
    }
    if requester.subject() == product.custodian {
        return Err(CustodyError::AlreadyCustodian { id: product.id });
    }
    if product.is_grouped() {
        match container {
            Some(container) if container.custodian == requester.subject() => {}
            Some(_) => return Err(CustodyError::StillGrouped { id: product.id }),
            None => {
                return Err(CustodyError::InvalidRecord {
                    key: product.container_id.clone(),
                    reason: "grouped product references a missing container".to_string(),
                })
            }
        }
    }

    product.custodian = requester.subject().to_string();
    product.location = new_location.to_string();
    product.timestamp = now;
    Ok(product)
}

/// Container custody transfer.
///
/// Containers are the aggregation root, so there is no outer lock; member
/// products catch up individually through [`transfer_product`] afterwards.
pub fn transfer_container(
    mut container: Container,
    requester: &Identity,
    now: i64,
) -> Result<Container, CustodyError> {
    if !container.accessible_by(requester) {
        return Err(CustodyError::not_found(DocKind::Container, &container.id));
    }
    if requester.subject() == container.custodian {
        return Err(CustodyError::AlreadyCustodian { id: container.id });
    }

    container.custodian = requester.subject().to_string();
    container.timestamp = now;
    Ok(container)
}

/// Declare a product a member of a container.
///
/// Packaging physically co-locates goods, so the requester must hold both
/// records: custodian of the container and of the product.
pub fn package(
    mut container: Container,
    mut product: Product,
    requester: &Identity,
    now: i64,
) -> Result<(Container, Product), CustodyError> {
    if !container.accessible_by(requester) {
        return Err(CustodyError::not_found(DocKind::Container, &container.id));
    }
    if !product.accessible_by(requester) {
        return Err(CustodyError::not_found(DocKind::Product, &product.id));
    }
    if product.is_grouped() {
        return Err(CustodyError::AlreadyGrouped {
            id: product.id,
            container_id: product.container_id,
        });
    }
    if container.custodian != requester.subject() {
        return Err(CustodyError::NotCustodian {
            subject: requester.subject().to_string(),
            kind: DocKind::Container,
            id: container.id,
        });
    }
    if product.custodian != requester.subject() {
        return Err(CustodyError::NotCustodian {
            subject: requester.subject().to_string(),
            kind: DocKind::Product,
            id: product.id,
        });
    }

    if !container.holds(&product.id) {
        container.contents.push(product.id.clone());
    }
    product.container_id = container.id.clone();
    product.timestamp = now;
    container.timestamp = now;
    Ok((container, product))
}

/// Release a product from its container.
///
/// Only the container's custodian can unpackage; the product's own
/// custodian field is left as-is (it may still need to catch up).
pub fn unpackage(
    mut container: Container,
    mut product: Product,
    requester: &Identity,
    now: i64,
) -> Result<(Container, Product), CustodyError> {
    if !container.accessible_by(requester) {
        return Err(CustodyError::not_found(DocKind::Container, &container.id));
    }
    if !product.accessible_by(requester) {
        return Err(CustodyError::not_found(DocKind::Product, &product.id));
    }
    if container.custodian != requester.subject() {
        return Err(CustodyError::NotCustodian {
            subject: requester.subject().to_string(),
            kind: DocKind::Container,
            id: container.id,
        });
    }

    container.contents.retain(|id| id != &product.id);
    product.container_id.clear();
    product.timestamp = now;
    container.timestamp = now;
    Ok((container, product))
}
