//! In-process transports for tests.
//!
//! `RecordingTransport` keeps every request it receives and answers with a
//! canned response, an echo of the JSON body, or a transport failure.

use std::io;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, RequestBody};
use crate::transport::Transport;

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    handler: Handler,
}

impl RecordingTransport {
    pub fn with_handler(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Answers every request with `status` and `body`.
    pub fn replying(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::with_handler(move |_| Ok(json_response(status, body.clone())))
    }

    /// Fails every request as a timed-out transport would.
    pub fn failing() -> Self {
        Self::with_handler(|_| {
            Err(Error::Transport(ureq::Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "timed out",
            ))))
        })
    }

    /// Answers with the request's JSON object plus `"id": id`, status 200.
    pub fn echo_with_id(id: i64) -> Self {
        Self::with_handler(move |request| {
            let mut body = match &request.body {
                Some(RequestBody::Json(value)) => value.clone(),
                _ => Value::Object(Default::default()),
            };
            if let Value::Object(map) = &mut body {
                map.insert("id".to_string(), Value::from(id));
            }
            Ok(json_response(200, body.to_string()))
        })
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        (self.handler)(request)
    }
}

fn json_response(status: u16, body: String) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.into_bytes(),
    }
}
