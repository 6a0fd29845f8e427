//! Constructors that turn configuration into ready clients.

use tracing::info;

use crate::client::OperationsClient;
use crate::config::{HttpClientConfig, Settings};
use crate::error::Result;
use crate::transport::UreqTransport;

/// Transport bound to the configured base URL and timeout.
pub fn get_http_client(config: &HttpClientConfig) -> UreqTransport {
    info!(base_url = %config.url(), timeout = ?config.timeout(), "building http client");
    UreqTransport::new(config.url().as_str(), config.timeout())
}

/// Operations client for the fakebank service in `settings`.
pub fn get_operations_client(settings: &Settings) -> OperationsClient<UreqTransport> {
    operations_client(&settings.fake_bank_http_client)
}

pub fn operations_client(config: &HttpClientConfig) -> OperationsClient<UreqTransport> {
    OperationsClient::new(get_http_client(config))
}

/// Validate `url` and `timeout` (seconds) and build a client in one step.
pub fn connect(url: &str, timeout: f64) -> Result<OperationsClient<UreqTransport>> {
    Ok(operations_client(&HttpClientConfig::new(url, timeout)?))
}
