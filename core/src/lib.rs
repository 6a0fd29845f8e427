//! Synchronous test client for the fakebank operations API.
//!
//! # Overview
//! Layered from the wire up:
//! - `Transport` executes one plain-data `HttpRequest` (`UreqTransport` in
//!   production, an in-process recording transport in unit tests).
//! - `BaseClient` exposes GET/POST/PATCH/DELETE and reports each call to a
//!   `StepObserver`.
//! - `OperationsClient` maps list/get/create/update/delete onto
//!   `/fakebank/accounts` and handles the JSON schemas.
//! - `factory` builds clients from `config::Settings`.
//!
//! # Design
//! - Responses come back raw; only `OperationsClient::create_operation`
//!   parses a body.
//! - Default payload values come from an injected `Fake` generator, never
//!   from global state.
//! - Partial updates use `Patch<T>` so unset fields are omitted and explicit
//!   nulls survive.

pub mod base_client;
pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod fakers;
pub mod http;
pub mod observer;
pub mod routes;
#[cfg(test)]
mod testing;
pub mod transport;
pub mod types;

pub use base_client::BaseClient;
pub use client::OperationsClient;
pub use config::{HttpClientConfig, Settings};
pub use error::{Error, Result};
pub use factory::{connect, get_http_client, get_operations_client, operations_client};
pub use fakers::Fake;
pub use http::{FilePart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use observer::{NoopObserver, Step, StepLog, StepObserver, TracingObserver};
pub use routes::ApiRoute;
pub use transport::{Transport, UreqTransport};
pub use types::{CreateOperation, Operation, Operations, Patch, UpdateOperation};
