//! End-to-end custody flows through the contract surface: one world
//! state, several identities, operations invoked by wire name exactly as
//! a host transport would.

use custody_contract::contract::CustodyContract;
use custody_contract::identity::{InvocationContext, SubjectAttributeResolver};
use custody_contract::response::{status, ContractResponse};
use custody_core::adapters::memory_store::InMemoryWorldState;
use custody_core::adapters::system_clock::FixedClock;
use custody_core::domain::identity::StaticPolicy;
use custody_core::service::{operations, CustodyService};
use serde_json::json;
use std::sync::Arc;

fn supply_chain() -> CustodyContract<InMemoryWorldState, FixedClock> {
    // alice manufactures, carrier1 ships, bob receives. Nobody else may
    // even attempt a mutation.
    let policy = StaticPolicy::new()
        .grant("alice", operations::CREATE_PRODUCT)
        .grant("alice", operations::CREATE_CONTAINER)
        .grant("alice", operations::PACKAGE_PRODUCT)
        .grant("alice", operations::UNPACKAGE_PRODUCT)
        .grant("alice", operations::TRANSFER_PRODUCT_CUSTODY)
        .grant("carrier1", operations::TRANSFER_PRODUCT_CUSTODY)
        .grant("carrier1", operations::TRANSFER_CONTAINER_CUSTODY)
        .grant("bob", operations::TRANSFER_PRODUCT_CUSTODY);

    let service = CustodyService::new(InMemoryWorldState::new(), FixedClock(1_532_009_163));
    CustodyContract::new(
        service,
        Arc::new(SubjectAttributeResolver::new(Arc::new(policy))),
    )
}

fn invoke(
    contract: &CustodyContract<InMemoryWorldState, FixedClock>,
    subject: &str,
    operation: &str,
    args: &[&str],
) -> ContractResponse {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    contract.invoke(&InvocationContext::for_subject(subject), operation, &args)
}

fn create_product(
    contract: &CustodyContract<InMemoryWorldState, FixedClock>,
    subject: &str,
    id: &str,
    participants: &[&str],
) -> ContractResponse {
    let request = json!({
        "id": id,
        "productName": "sampleproduct",
        "metadata": "misc",
        "location": "india",
        "participants": participants,
    })
    .to_string();
    invoke(contract, subject, operations::CREATE_PRODUCT, &[&request])
}

#[test]
fn full_custody_lifecycle() {
    let contract = supply_chain();

    // Manufacture.
    let response = create_product(&contract, "alice", "P1", &["carrier1", "bob"]);
    assert_eq!(response.status, status::OK);

    let request = json!({"id": "C1", "participants": ["carrier1", "bob"]}).to_string();
    let response = invoke(&contract, "alice", operations::CREATE_CONTAINER, &[&request]);
    assert_eq!(response.status, status::OK);

    // Visibility: participants see the product, outsiders get 404.
    assert_eq!(
        invoke(&contract, "alice", operations::GET_SINGLE_PRODUCT, &["P1"]).status,
        status::OK
    );
    assert_eq!(
        invoke(&contract, "mallory", operations::GET_SINGLE_PRODUCT, &["P1"]).status,
        status::NOT_FOUND
    );

    // A no-op transfer by the current custodian is rejected.
    let response = invoke(
        &contract,
        "alice",
        operations::TRANSFER_PRODUCT_CUSTODY,
        &["P1", "Warehouse-2"],
    );
    assert_eq!(response.status, status::FORBIDDEN);
    assert!(response.message.unwrap().contains("already custodian"));

    // Package, then verify the container lock.
    let response = invoke(&contract, "alice", operations::PACKAGE_PRODUCT, &["C1", "P1"]);
    assert_eq!(response.status, status::OK);

    let response = invoke(
        &contract,
        "bob",
        operations::TRANSFER_PRODUCT_CUSTODY,
        &["P1", "Shop-5"],
    );
    assert_eq!(response.status, status::FORBIDDEN);
    assert!(response.message.unwrap().contains("unpackaged"));

    // The container changes hands as a unit, members catch up after.
    let response = invoke(
        &contract,
        "carrier1",
        operations::TRANSFER_CONTAINER_CUSTODY,
        &["C1"],
    );
    assert_eq!(response.status, status::OK);

    let response = invoke(
        &contract,
        "carrier1",
        operations::TRANSFER_PRODUCT_CUSTODY,
        &["P1", "Port-9"],
    );
    assert_eq!(response.status, status::OK);

    let record = invoke(&contract, "bob", operations::GET_SINGLE_PRODUCT, &["P1"]);
    let product: serde_json::Value = serde_json::from_slice(&record.payload.unwrap()).unwrap();
    assert_eq!(product["custodian"], "carrier1");
    assert_eq!(product["location"], "Port-9");
    assert_eq!(product["containerID"], "C1");
}

#[test]
fn capability_gate_precedes_entity_state() {
    let contract = supply_chain();

    // mallory was never granted createProduct: 403 before any state is read.
    let response = create_product(&contract, "mallory", "P1", &[]);
    assert_eq!(response.status, status::FORBIDDEN);

    // The id is still free afterwards.
    let response = create_product(&contract, "alice", "P1", &[]);
    assert_eq!(response.status, status::OK);
}

#[test]
fn creation_is_unique_per_id() {
    let contract = supply_chain();

    assert_eq!(create_product(&contract, "alice", "P1", &[]).status, status::OK);

    let response = create_product(&contract, "alice", "P1", &["bob"]);
    assert_eq!(response.status, status::FORBIDDEN);
    assert!(response.message.unwrap().contains("existing"));

    // The original record survived: bob was not added as a participant.
    assert_eq!(
        invoke(&contract, "bob", operations::GET_SINGLE_PRODUCT, &["P1"]).status,
        status::NOT_FOUND
    );
}

#[test]
fn ungrouped_listing_tracks_packaging() {
    let contract = supply_chain();

    create_product(&contract, "alice", "P1", &[]);
    create_product(&contract, "alice", "P2", &[]);
    let request = json!({"id": "C1"}).to_string();
    invoke(&contract, "alice", operations::CREATE_CONTAINER, &[&request]);
    invoke(&contract, "alice", operations::PACKAGE_PRODUCT, &["C1", "P1"]);

    let response = invoke(&contract, "alice", operations::GET_UNGROUPED_PRODUCTS, &[]);
    assert_eq!(response.status, status::OK);
    let listed: serde_json::Value = serde_json::from_slice(&response.payload.unwrap()).unwrap();
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["P2"]);

    invoke(&contract, "alice", operations::UNPACKAGE_PRODUCT, &["P1"]);
    let response = invoke(&contract, "alice", operations::GET_UNGROUPED_PRODUCTS, &[]);
    let listed: serde_json::Value = serde_json::from_slice(&response.payload.unwrap()).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[test]
fn listings_are_scoped_per_caller() {
    let contract = supply_chain();

    create_product(&contract, "alice", "P1", &[]);
    create_product(&contract, "alice", "P2", &["bob"]);

    let response = invoke(&contract, "alice", operations::GET_ALL_PRODUCTS, &[]);
    let all: serde_json::Value = serde_json::from_slice(&response.payload.unwrap()).unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let response = invoke(&contract, "bob", operations::GET_ALL_PRODUCTS, &[]);
    let visible: serde_json::Value = serde_json::from_slice(&response.payload.unwrap()).unwrap();
    let ids: Vec<&str> = visible
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["P2"]);
}
