//! # Custody Service
//!
//! Orchestration of every operation over the world state port: resolve the
//! records, run the pure validation from [`crate::domain::transfer`], and
//! persist whole re-serialized documents. Each operation performs at most
//! one terminal write per record; all checks short-circuit before any
//! write happens.

use crate::domain::access::Accessible;
use crate::domain::entities::{
    Container, CreateContainerRequest, CreateProductRequest, Product, PRODUCT_DOC_TYPE,
};
use crate::domain::errors::{CustodyError, DocKind};
use crate::domain::identity::Identity;
use crate::domain::query::{collect_accessible_products, collect_selected_products};
use crate::domain::transfer;
use crate::ports::clock::Clock;
use crate::ports::store::{Selector, WorldState};
use serde::Serialize;
use tracing::{info, warn};

/// Wire names of the operation surface, shared with the dispatch layer and
/// with invoke policies.
pub mod operations {
    pub const CREATE_PRODUCT: &str = "createProduct";
    pub const GET_ALL_PRODUCTS: &str = "getAllProducts";
    pub const GET_SINGLE_PRODUCT: &str = "getSingleProduct";
    pub const GET_UNGROUPED_PRODUCTS: &str = "getUngroupedProducts";
    pub const TRANSFER_PRODUCT_CUSTODY: &str = "transferProductCustody";
    pub const CREATE_CONTAINER: &str = "createContainer";
    pub const GET_SINGLE_CONTAINER: &str = "getSingleContainer";
    pub const TRANSFER_CONTAINER_CUSTODY: &str = "transferContainerCustody";
    pub const PACKAGE_PRODUCT: &str = "packageProduct";
    pub const UNPACKAGE_PRODUCT: &str = "unpackageProduct";
}

/// Service tunables.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Upper bound on records returned by a single listing (DoS guard).
    pub max_listing_records: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_listing_records: 10_000,
        }
    }
}

/// The custody service. Synchronous and run-to-completion; concurrency
/// control belongs to the host ledger.
pub struct CustodyService<S: WorldState, C: Clock> {
    store: S,
    clock: C,
    config: ServiceConfig,
}

impl<S: WorldState, C: Clock> CustodyService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, ServiceConfig::default())
    }

    pub fn with_config(store: S, clock: C, config: ServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Create a new product. The creator becomes custodian and first-class
    /// participant. Fails if the id is already taken.
    pub fn create_product(
        &self,
        identity: &Identity,
        request: CreateProductRequest,
    ) -> Result<String, CustodyError> {
        self.require_capability(identity, operations::CREATE_PRODUCT)?;
        request.validate()?;
        self.require_vacant(&request.id, DocKind::Product)?;

        let product = Product::from_request(request, identity.subject(), self.clock.unix_now());
        self.put_document(&product.id, &product)?;

        info!(id = %product.id, custodian = %product.custodian, "created product");
        Ok(product.id)
    }

    /// Every product record visible to the caller, as raw stored bytes.
    pub fn get_all_products(&self, identity: &Identity) -> Result<Vec<Vec<u8>>, CustodyError> {
        let entries = self.store.scan_all()?;
        collect_accessible_products(entries, identity, self.config.max_listing_records)
    }

    /// Point lookup of a product, raw stored bytes.
    ///
    /// An existing but inaccessible record is reported exactly like an
    /// absent one.
    pub fn get_single_product(
        &self,
        identity: &Identity,
        id: &str,
    ) -> Result<Vec<u8>, CustodyError> {
        let bytes = self
            .store
            .get_state(id)?
            .ok_or_else(|| CustodyError::not_found(DocKind::Product, id))?;
        let product = Product::parse(id, &bytes)?;
        if !product.accessible_by(identity) {
            return Err(CustodyError::not_found(DocKind::Product, id));
        }
        Ok(bytes)
    }

    /// Accessible products not yet grouped into any container, via the
    /// store's selector index rather than a full scan.
    pub fn get_ungrouped_products(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Vec<u8>>, CustodyError> {
        let selector = Selector::new(PRODUCT_DOC_TYPE).field("containerID", "");
        let entries = self.store.query(&selector)?;
        collect_selected_products(entries, identity, self.config.max_listing_records)
    }

    /// Claim custody of a product for the caller.
    ///
    /// Grouped products are locked: their custody can only catch up to the
    /// container's current custodian.
    pub fn transfer_product_custody(
        &self,
        identity: &Identity,
        id: &str,
        new_location: &str,
    ) -> Result<String, CustodyError> {
        self.require_capability(identity, operations::TRANSFER_PRODUCT_CUSTODY)?;
        let product = self.load_product(id)?;

        // Mask before touching the container so an outsider learns nothing,
        // not even that the product is grouped.
        if !product.accessible_by(identity) {
            return Err(CustodyError::not_found(DocKind::Product, id));
        }

        let container = if product.is_grouped() {
            match self.store.get_state(&product.container_id)? {
                Some(bytes) => Some(Container::parse(&product.container_id, &bytes)?),
                None => None,
            }
        } else {
            None
        };

        let updated = transfer::transfer_product(
            product,
            container.as_ref(),
            identity,
            new_location,
            self.clock.unix_now(),
        )?;
        self.put_document(id, &updated)?;

        info!(id, custodian = %updated.custodian, location = %updated.location, "transferred product custody");
        Ok(id.to_string())
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    /// Create a new container with the creator as custodian.
    pub fn create_container(
        &self,
        identity: &Identity,
        request: CreateContainerRequest,
    ) -> Result<String, CustodyError> {
        self.require_capability(identity, operations::CREATE_CONTAINER)?;
        request.validate()?;
        self.require_vacant(&request.id, DocKind::Container)?;

        let container =
            Container::from_request(request, identity.subject(), self.clock.unix_now());
        self.put_document(&container.id, &container)?;

        info!(id = %container.id, custodian = %container.custodian, "created container");
        Ok(container.id)
    }

    /// Point lookup of a container, raw stored bytes, same masking rule as
    /// products.
    pub fn get_single_container(
        &self,
        identity: &Identity,
        id: &str,
    ) -> Result<Vec<u8>, CustodyError> {
        let bytes = self
            .store
            .get_state(id)?
            .ok_or_else(|| CustodyError::not_found(DocKind::Container, id))?;
        let container = Container::parse(id, &bytes)?;
        if !container.accessible_by(identity) {
            return Err(CustodyError::not_found(DocKind::Container, id));
        }
        Ok(bytes)
    }

    /// Claim custody of a whole container for the caller. Member products
    /// catch up individually via [`Self::transfer_product_custody`].
    pub fn transfer_container_custody(
        &self,
        identity: &Identity,
        id: &str,
    ) -> Result<String, CustodyError> {
        self.require_capability(identity, operations::TRANSFER_CONTAINER_CUSTODY)?;
        let container = self.load_container(id)?;

        let updated = transfer::transfer_container(container, identity, self.clock.unix_now())?;
        self.put_document(id, &updated)?;

        info!(id, custodian = %updated.custodian, "transferred container custody");
        Ok(id.to_string())
    }

    /// Declare a product a member of a container. The caller must hold
    /// custody of both. Writes both records, product last.
    pub fn package_product(
        &self,
        identity: &Identity,
        container_id: &str,
        product_id: &str,
    ) -> Result<String, CustodyError> {
        self.require_capability(identity, operations::PACKAGE_PRODUCT)?;
        let container = self.load_container(container_id)?;
        let product = self.load_product(product_id)?;

        let (container, product) =
            transfer::package(container, product, identity, self.clock.unix_now())?;
        self.put_document(container_id, &container)?;
        self.put_document(product_id, &product)?;

        info!(container_id, product_id, "packaged product");
        Ok(product_id.to_string())
    }

    /// Release a product from its container. Only the container's
    /// custodian can unpackage.
    pub fn unpackage_product(
        &self,
        identity: &Identity,
        product_id: &str,
    ) -> Result<String, CustodyError> {
        self.require_capability(identity, operations::UNPACKAGE_PRODUCT)?;
        let product = self.load_product(product_id)?;

        if !product.accessible_by(identity) {
            return Err(CustodyError::not_found(DocKind::Product, product_id));
        }
        if !product.is_grouped() {
            return Err(CustodyError::NotGrouped {
                id: product_id.to_string(),
            });
        }
        let container = self.load_container(&product.container_id)?;

        let container_id = container.id.clone();
        let (container, product) =
            transfer::unpackage(container, product, identity, self.clock.unix_now())?;
        self.put_document(&container_id, &container)?;
        self.put_document(product_id, &product)?;

        info!(container_id = %container_id, product_id, "unpackaged product");
        Ok(product_id.to_string())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require_capability(
        &self,
        identity: &Identity,
        operation: &str,
    ) -> Result<(), CustodyError> {
        if identity.can_invoke(operation) {
            Ok(())
        } else {
            warn!(subject = %identity.subject(), operation, "capability check failed");
            Err(CustodyError::NotAuthorized {
                operation: operation.to_string(),
            })
        }
    }

    fn require_vacant(&self, id: &str, kind: DocKind) -> Result<(), CustodyError> {
        if self.store.get_state(id)?.is_some() {
            return Err(CustodyError::AlreadyExists {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn load_product(&self, id: &str) -> Result<Product, CustodyError> {
        let bytes = self
            .store
            .get_state(id)?
            .ok_or_else(|| CustodyError::not_found(DocKind::Product, id))?;
        Product::parse(id, &bytes)
    }

    fn load_container(&self, id: &str) -> Result<Container, CustodyError> {
        let bytes = self
            .store
            .get_state(id)?
            .ok_or_else(|| CustodyError::not_found(DocKind::Container, id))?;
        Container::parse(id, &bytes)
    }

    fn put_document<T: Serialize>(&self, key: &str, document: &T) -> Result<(), CustodyError> {
        let bytes = serde_json::to_vec(document).map_err(|e| CustodyError::InvalidRecord {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.store.put_state(key, bytes)?;
        Ok(())
    }
}
