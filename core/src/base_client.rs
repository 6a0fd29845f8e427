//! Verb-level client over a `Transport`.
//!
//! # Design
//! Each verb builds an `HttpRequest`, forwards it to the transport exactly
//! once and returns the response untouched. After the transport returns,
//! the call is reported to the `StepObserver` with its payload and, when a
//! response arrived, its status.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::http::{FilePart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::observer::{notify, Step, StepObserver, TracingObserver};
use crate::transport::Transport;

pub struct BaseClient<T> {
    transport: T,
    observer: Arc<dyn StepObserver>,
}

impl<T: Transport> BaseClient<T> {
    /// Client reporting steps through `tracing`.
    pub fn new(transport: T) -> Self {
        Self::with_observer(transport, Arc::new(TracingObserver))
    }

    pub fn with_observer(transport: T, observer: Arc<dyn StepObserver>) -> Self {
        Self {
            transport,
            observer,
        }
    }

    /// Same transport, different observer.
    pub fn observed_by(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn observer(&self) -> &dyn StepObserver {
        self.observer.as_ref()
    }

    pub fn get(&self, path: &str, query: Option<&[(String, String)]>) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(HttpMethod::Get, path);
        if let Some(query) = query {
            request.query = query.to_vec();
        }
        self.send(request)
    }

    /// POST with a JSON body, form fields, or files. Files take precedence
    /// (sent multipart together with any form fields), then form fields,
    /// then JSON.
    pub fn post(
        &self,
        path: &str,
        json: Option<Value>,
        form: Option<Vec<(String, String)>>,
        files: Option<Vec<FilePart>>,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(HttpMethod::Post, path);
        request.body = RequestBody::from_parts(json, form, files);
        self.send(request)
    }

    pub fn patch(&self, path: &str, json: Option<Value>) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(HttpMethod::Patch, path);
        request.body = json.map(RequestBody::Json);
        self.send(request)
    }

    pub fn delete(&self, path: &str) -> Result<HttpResponse> {
        self.send(HttpRequest::new(HttpMethod::Delete, path))
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let result = self.transport.execute(&request);
        let step = Step::Request {
            method: request.method,
            target: request.target(),
            payload: request.body.as_ref().map(RequestBody::describe),
            status: result.as_ref().ok().map(|r| r.status),
        };
        notify(self.observer.as_ref(), &step);
        result
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for BaseClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseClient")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
