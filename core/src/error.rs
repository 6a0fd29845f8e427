//! Error types for the fakebank client.
//!
//! # Design
//! Status codes are never turned into errors here: verb-level and
//! resource-level calls hand the raw `HttpResponse` back so callers can
//! assert on it. The variants below cover only what can fail on this side
//! of the wire, plus the one schema check done by
//! `OperationsClient::create_operation`.

use thiserror::Error;

/// Errors returned by the configuration layer, the transport and the
/// schema (de)serialization helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed before a response arrived (connection refused,
    /// DNS failure, timeout). The underlying error is kept untouched.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// Reading a local file for a multipart upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Base URL or timeout rejected before any request was possible.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body did not match the expected schema.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
