use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const OPERATIONS_PATH: &str = "/fakebank/accounts";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: i64,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub category: String,
    pub description: String,
    #[serde(rename = "transactionDate")]
    pub transaction_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct CreateOperation {
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub category: String,
    pub description: String,
    #[serde(rename = "transactionDate")]
    pub transaction_date: NaiveDate,
}

#[derive(Clone)]
pub struct Store {
    operations: Arc<RwLock<BTreeMap<i64, Operation>>>,
    next_id: Arc<AtomicI64>,
}

impl Store {
    /// Empty store whose first created operation gets `first_id`.
    pub fn starting_at(first_id: i64) -> Self {
        Self {
            operations: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(first_id)),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

pub fn app() -> Router {
    app_with_store(Store::default())
}

pub fn app_with_store(store: Store) -> Router {
    Router::new()
        .route(OPERATIONS_PATH, get(list_operations).post(create_operation))
        .route(
            "/fakebank/accounts/{id}",
            get(get_operation).patch(update_operation).delete(delete_operation),
        )
        .with_state(store)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_operations(State(store): State<Store>) -> Json<Vec<Operation>> {
    let operations = store.operations.read().await;
    Json(operations.values().cloned().collect())
}

async fn create_operation(
    State(store): State<Store>,
    Json(input): Json<CreateOperation>,
) -> (StatusCode, Json<Operation>) {
    let operation = Operation {
        id: store.next_id.fetch_add(1, Ordering::SeqCst),
        debit: input.debit,
        credit: input.credit,
        category: input.category,
        description: input.description,
        transaction_date: input.transaction_date,
    };
    info!(id = operation.id, "operation created");
    store
        .operations
        .write()
        .await
        .insert(operation.id, operation.clone());
    (StatusCode::CREATED, Json(operation))
}

async fn get_operation(
    State(store): State<Store>,
    Path(id): Path<i64>,
) -> Result<Json<Operation>, StatusCode> {
    let operations = store.operations.read().await;
    operations.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Apply only the keys present in the body; `null` clears the nullable
/// amounts and is rejected for the other fields.
async fn update_operation(
    State(store): State<Store>,
    Path(id): Path<i64>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Operation>, StatusCode> {
    let mut operations = store.operations.write().await;
    let current = operations.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let mut merged = serde_json::to_value(current).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in input {
            if key == "id" || !fields.contains_key(&key) {
                return Err(StatusCode::UNPROCESSABLE_ENTITY);
            }
            fields.insert(key, value);
        }
    }
    let updated: Operation =
        serde_json::from_value(merged).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    operations.insert(id, updated.clone());
    Ok(Json(updated))
}

async fn delete_operation(
    State(store): State<Store>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut operations = store.operations.write().await;
    operations
        .remove(&id)
        .map(|_| StatusCode::OK)
        .ok_or(StatusCode::NOT_FOUND)
}
