//! # Operation Dispatch
//!
//! Routes invoke-by-name requests onto the custody service. The host
//! transport delivers an operation name and string arguments; everything
//! returned goes through the [`ContractResponse`] envelope.

use crate::identity::{IdentityResolver, InvocationContext};
use crate::response::{join_records, status, ContractResponse};
use custody_core::domain::entities::{CreateContainerRequest, CreateProductRequest};
use custody_core::domain::identity::Identity;
use custody_core::ports::clock::Clock;
use custody_core::ports::store::WorldState;
use custody_core::service::{operations, CustodyService};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// The contract surface: one synchronous entry point per host invocation.
pub struct CustodyContract<S: WorldState, C: Clock> {
    service: CustodyService<S, C>,
    resolver: Arc<dyn IdentityResolver>,
}

impl<S: WorldState, C: Clock> CustodyContract<S, C> {
    pub fn new(service: CustodyService<S, C>, resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { service, resolver }
    }

    /// Execute one invocation against the current world state snapshot.
    pub fn invoke(
        &self,
        ctx: &InvocationContext,
        operation: &str,
        args: &[String],
    ) -> ContractResponse {
        let identity = match self.resolver.resolve(ctx) {
            Ok(identity) => identity,
            Err(e) => {
                return ContractResponse::error(
                    status::INTERNAL,
                    format!("error getting invoker identity: {e}"),
                )
            }
        };
        debug!(subject = %identity.subject(), operation, "invocation");

        match operation {
            operations::CREATE_PRODUCT => self.create_product(&identity, args),
            operations::GET_ALL_PRODUCTS => self.get_all_products(&identity, args),
            operations::GET_SINGLE_PRODUCT => self.get_single_product(&identity, args),
            operations::GET_UNGROUPED_PRODUCTS => self.get_ungrouped_products(&identity, args),
            operations::TRANSFER_PRODUCT_CUSTODY => {
                self.transfer_product_custody(&identity, args)
            }
            operations::CREATE_CONTAINER => self.create_container(&identity, args),
            operations::GET_SINGLE_CONTAINER => self.get_single_container(&identity, args),
            operations::TRANSFER_CONTAINER_CUSTODY => {
                self.transfer_container_custody(&identity, args)
            }
            operations::PACKAGE_PRODUCT => self.package_product(&identity, args),
            operations::UNPACKAGE_PRODUCT => self.unpackage_product(&identity, args),
            _ => ContractResponse::error(
                status::BAD_REQUEST,
                format!("unknown operation: {operation}"),
            ),
        }
    }

    fn create_product(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 1) {
            return response;
        }
        let request: CreateProductRequest = match serde_json::from_str(&args[0]) {
            Ok(request) => request,
            Err(e) => {
                return ContractResponse::error(
                    status::BAD_REQUEST,
                    format!("malformed creation request: {e}"),
                )
            }
        };
        match self.service.create_product(identity, request) {
            Ok(id) => generated_id(&id),
            Err(e) => e.into(),
        }
    }

    fn get_all_products(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 0) {
            return response;
        }
        match self.service.get_all_products(identity) {
            Ok(records) => ContractResponse::success(join_records(&records)),
            Err(e) => e.into(),
        }
    }

    fn get_single_product(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 1) {
            return response;
        }
        match self.service.get_single_product(identity, &args[0]) {
            Ok(record) => ContractResponse::success(record),
            Err(e) => e.into(),
        }
    }

    fn get_ungrouped_products(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 0) {
            return response;
        }
        match self.service.get_ungrouped_products(identity) {
            Ok(records) => ContractResponse::success(join_records(&records)),
            Err(e) => e.into(),
        }
    }

    fn transfer_product_custody(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 2) {
            return response;
        }
        match self
            .service
            .transfer_product_custody(identity, &args[0], &args[1])
        {
            Ok(id) => ContractResponse::success(id.into_bytes()),
            Err(e) => e.into(),
        }
    }

    fn create_container(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 1) {
            return response;
        }
        let request: CreateContainerRequest = match serde_json::from_str(&args[0]) {
            Ok(request) => request,
            Err(e) => {
                return ContractResponse::error(
                    status::BAD_REQUEST,
                    format!("malformed creation request: {e}"),
                )
            }
        };
        match self.service.create_container(identity, request) {
            Ok(id) => generated_id(&id),
            Err(e) => e.into(),
        }
    }

    fn get_single_container(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 1) {
            return response;
        }
        match self.service.get_single_container(identity, &args[0]) {
            Ok(record) => ContractResponse::success(record),
            Err(e) => e.into(),
        }
    }

    fn transfer_container_custody(
        &self,
        identity: &Identity,
        args: &[String],
    ) -> ContractResponse {
        if let Err(response) = expect_args(args, 1) {
            return response;
        }
        match self.service.transfer_container_custody(identity, &args[0]) {
            Ok(id) => ContractResponse::success(id.into_bytes()),
            Err(e) => e.into(),
        }
    }

    fn package_product(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 2) {
            return response;
        }
        match self.service.package_product(identity, &args[0], &args[1]) {
            Ok(id) => ContractResponse::success(id.into_bytes()),
            Err(e) => e.into(),
        }
    }

    fn unpackage_product(&self, identity: &Identity, args: &[String]) -> ContractResponse {
        if let Err(response) = expect_args(args, 1) {
            return response;
        }
        match self.service.unpackage_product(identity, &args[0]) {
            Ok(id) => ContractResponse::success(id.into_bytes()),
            Err(e) => e.into(),
        }
    }
}

fn expect_args(args: &[String], expected: usize) -> Result<(), ContractResponse> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ContractResponse::error(
            status::BAD_REQUEST,
            format!(
                "incorrect number of arguments: expected {expected}, got {}",
                args.len()
            ),
        ))
    }
}

fn generated_id(id: &str) -> ContractResponse {
    ContractResponse::success(json!({ "generatedID": id }).to_string().into_bytes())
}
