//! Full CRUD lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every
//! `OperationsClient` action over real HTTP through `UreqTransport`, so the
//! schemas, aliases and partial-update encoding are checked against an
//! independent implementation of the backend.

use std::sync::Arc;

use chrono::NaiveDate;
use fakebank_core::{
    connect, CreateOperation, Fake, HttpMethod, Operation, Operations, Step, StepLog,
    UpdateOperation,
};

/// Start the mock server on a background runtime and return its base URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn crud_lifecycle() {
    let base_url = spawn_server();
    let client = connect(&base_url, 5.0).unwrap();

    // Step 1: list — should be empty.
    let response = client.get_operations_api().unwrap();
    assert_eq!(response.status, 200);
    assert!(Operations::from_json(&response.body).unwrap().is_empty());

    // Step 2: create with explicit values.
    let request = CreateOperation {
        debit: Some(-25.5),
        credit: None,
        category: "fuel".to_string(),
        description: "Station stop.".to_string(),
        transaction_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
    };
    let response = client.create_operation_api(&request).unwrap();
    assert_eq!(response.status, 201);
    let created = Operation::from_json(&response.body).unwrap();
    assert_eq!(created.fields, request);
    let id = created.id;

    // Step 3: get the created operation.
    let response = client.get_operation_api(id).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(Operation::from_json(&response.body).unwrap(), created);

    // Step 4: update only the category.
    let update = UpdateOperation::default().with_category("food");
    let response = client.update_operation_api(id, &update).unwrap();
    assert_eq!(response.status, 200);
    let updated = Operation::from_json(&response.body).unwrap();
    assert_eq!(updated.fields.category, "food");
    assert_eq!(updated.fields.debit, Some(-25.5));
    assert_eq!(updated.fields.description, "Station stop.");

    // Step 5: explicit null clears the debit.
    let update = UpdateOperation::default().with_debit(None);
    let response = client.update_operation_api(id, &update).unwrap();
    let updated = Operation::from_json(&response.body).unwrap();
    assert_eq!(updated.fields.debit, None);
    assert_eq!(updated.fields.category, "food");

    // Step 6: convenience create.
    let generated = client.create_operation().unwrap();
    assert_ne!(generated.id, id);

    // Step 7: list — two items.
    let response = client.get_operations_api().unwrap();
    let operations = Operations::from_json(&response.body).unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(operations.get(generated.id), Some(&generated));

    // Step 8: delete.
    let response = client.delete_operation_api(id).unwrap();
    assert_eq!(response.status, 200);

    // Step 9: get after delete — raw 404, not an error.
    let response = client.get_operation_api(id).unwrap();
    assert_eq!(response.status, 404);

    // Step 10: delete again — raw 404.
    let response = client.delete_operation_api(id).unwrap();
    assert_eq!(response.status, 404);
}

#[test]
fn invalid_id_returns_raw_response() {
    let base_url = spawn_server();
    let log = Arc::new(StepLog::new());
    let client = connect(&base_url, 5.0).unwrap().with_observer(log.clone());

    let response = client.get_operation_api(-1).unwrap();
    assert_eq!(response.status, 404);

    assert_eq!(
        log.steps(),
        vec![
            Step::action("Get operation by id -1"),
            Step::Request {
                method: HttpMethod::Get,
                target: "/fakebank/accounts/-1".to_string(),
                payload: None,
                status: Some(404),
            },
        ]
    );
}

#[test]
fn generated_create_round_trips_every_field() {
    let base_url = spawn_server();
    let client = connect(&base_url, 5.0)
        .unwrap()
        .with_fake(Arc::new(Fake::seeded(2025)));

    let created = client.create_operation().unwrap();
    assert_eq!(created.fields, Fake::seeded(2025).create_operation());
}

#[test]
fn generated_update_is_applied_in_full() {
    let base_url = spawn_server();
    let fake = Fake::seeded(8);
    let client = connect(&base_url, 5.0).unwrap();

    let created = client.create_operation().unwrap();
    let update = fake.update_operation();
    let response = client.update_operation_api(created.id, &update).unwrap();
    let updated = Operation::from_json(&response.body).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.fields.category, *update.category.as_option().unwrap());
    assert_eq!(updated.fields.transaction_date, *update.transaction_date.as_option().unwrap());
}

#[test]
fn unknown_route_body_does_not_parse_as_operation() {
    let base_url = spawn_server();
    let client = connect(&base_url, 5.0).unwrap();

    // Nothing listens on this path, so the body is not an operation.
    let response = client.base().post("/fakebank/cards", None, None, None).unwrap();
    assert_eq!(response.status, 404);
    assert!(Operation::from_json(&response.body).is_err());
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let client = connect("http://127.0.0.1:9", 0.5).unwrap();
    let err = client.delete_operation_api(7).unwrap_err();
    assert!(matches!(err, fakebank_core::Error::Transport(_)));
}
