//! Business-level client for the fakebank operations resource.
//!
//! # Design
//! Every `*_api` method maps one action to one verb call on the
//! `BaseClient` and returns the raw `HttpResponse`, so tests can assert on
//! status codes and malformed bodies themselves. Ids are forwarded as-is;
//! the server decides what a bad id means. `create_operation` is the only
//! method that reads the response body.

use std::sync::Arc;

use tracing::debug;

use crate::base_client::BaseClient;
use crate::error::{Error, Result};
use crate::fakers::Fake;
use crate::http::HttpResponse;
use crate::observer::{notify, Step, StepObserver};
use crate::routes::ApiRoute;
use crate::transport::Transport;
use crate::types::{CreateOperation, Operation, UpdateOperation};

/// Synchronous client for `/fakebank/accounts`.
///
/// Holds no per-call state; the generator is only used by
/// `create_operation` to fill in the request.
pub struct OperationsClient<T> {
    base: BaseClient<T>,
    fake: Arc<Fake>,
}

impl<T: Transport> OperationsClient<T> {
    pub fn new(transport: T) -> Self {
        Self::from_base(BaseClient::new(transport), Arc::new(Fake::new()))
    }

    pub fn from_base(base: BaseClient<T>, fake: Arc<Fake>) -> Self {
        Self { base, fake }
    }

    /// Replace the step observer, keeping the transport and generator.
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.base = self.base.observed_by(observer);
        self
    }

    /// Replace the generator used for default payloads.
    pub fn with_fake(mut self, fake: Arc<Fake>) -> Self {
        self.fake = fake;
        self
    }

    pub fn base(&self) -> &BaseClient<T> {
        &self.base
    }

    pub fn fake(&self) -> &Fake {
        &self.fake
    }

    fn step(&self, title: String) {
        notify(self.base.observer(), &Step::action(title));
    }

    pub fn get_operations_api(&self) -> Result<HttpResponse> {
        self.step("Get list of operations".to_string());
        self.base.get(ApiRoute::Operations.as_str(), None)
    }

    pub fn get_operation_api(&self, operation_id: i64) -> Result<HttpResponse> {
        self.step(format!("Get operation by id {operation_id}"));
        self.base.get(&ApiRoute::Operations.item(operation_id), None)
    }

    pub fn create_operation_api(&self, operation: &CreateOperation) -> Result<HttpResponse> {
        self.step("Create operation".to_string());
        let json = serde_json::to_value(operation).map_err(Error::Serialization)?;
        self.base.post(ApiRoute::Operations.as_str(), Some(json), None, None)
    }

    pub fn update_operation_api(
        &self,
        operation_id: i64,
        operation: &UpdateOperation,
    ) -> Result<HttpResponse> {
        self.step(format!("Update operation by id {operation_id}"));
        let json = serde_json::to_value(operation).map_err(Error::Serialization)?;
        self.base.patch(&ApiRoute::Operations.item(operation_id), Some(json))
    }

    pub fn delete_operation_api(&self, operation_id: i64) -> Result<HttpResponse> {
        self.step(format!("Delete operation by id {operation_id}"));
        self.base.delete(&ApiRoute::Operations.item(operation_id))
    }

    /// Create an operation from generated data and parse the server's
    /// answer.
    ///
    /// Fails with `Error::Deserialization` when the body is not an
    /// operation; the status code itself is not checked.
    pub fn create_operation(&self) -> Result<Operation> {
        let request = self.fake.create_operation();
        let response = self.create_operation_api(&request)?;
        debug!(status = response.status, "parsing created operation");
        Operation::from_json(&response.body)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for OperationsClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationsClient")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}
