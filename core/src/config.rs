//! Connection settings for fakebank services.
//!
//! # Design
//! `HttpClientConfig` can only hold an absolute http(s) URL and a positive
//! timeout; every constructor, serde included, goes through the same
//! check. `Settings` reads the environment with a `.` between the section
//! and the key, e.g. `FAKE_BANK_HTTP_CLIENT.URL`. Empty variables count as
//! unset.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Base URL and per-request timeout of one backing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHttpClientConfig")]
pub struct HttpClientConfig {
    url: Url,
    /// Seconds.
    timeout: f64,
}

#[derive(Deserialize)]
struct RawHttpClientConfig {
    url: String,
    timeout: f64,
}

impl TryFrom<RawHttpClientConfig> for HttpClientConfig {
    type Error = Error;

    fn try_from(raw: RawHttpClientConfig) -> Result<Self> {
        HttpClientConfig::new(&raw.url, raw.timeout)
    }
}

impl HttpClientConfig {
    pub fn new(url: &str, timeout: f64) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::InvalidConfig(format!("invalid base url {url:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "base url must be an absolute http(s) url, got {url}"
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(Error::InvalidConfig(format!(
                "base url must not carry a query or fragment, got {url}"
            )));
        }
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "timeout must be a positive number of seconds, got {timeout}"
            )));
        }
        Ok(Self { url, timeout })
    }

    /// Read `{prefix}.URL` and `{prefix}.TIMEOUT` through `lookup`.
    pub fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| {
            let name = format!("{prefix}.{key}");
            lookup(&name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::InvalidConfig(format!("{name} is not set")))
                .map(|v| (name, v))
        };
        let (_, url) = read("URL")?;
        let (name, raw_timeout) = read("TIMEOUT")?;
        let timeout = raw_timeout
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidConfig(format!("{name} is not a number: {raw_timeout:?}")))?;
        Self::new(url.trim(), timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL as a string.
    pub fn client_url(&self) -> String {
        self.url.to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

/// Every service the test suite talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub fake_bank_http_client: HttpClientConfig,
}

impl Settings {
    pub const FAKE_BANK_PREFIX: &'static str = "FAKE_BANK_HTTP_CLIENT";

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            fake_bank_http_client: HttpClientConfig::from_lookup(Self::FAKE_BANK_PREFIX, lookup)?,
        })
    }
}
