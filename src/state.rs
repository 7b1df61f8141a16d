use std::env;
use std::time::Duration;

use crate::client::Client;
use crate::error::HealthzError;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub bind_address: String,
    /// Base URL of the NGINX Plus API.
    pub api_url: String,
    /// API version; the client default when unset.
    pub api_version: Option<u32>,
    /// Per-request deadline; the client default when unset.
    pub api_timeout: Option<Duration>,
}

impl Config {
    /// Creates Config from environment variables with defaults.
    pub fn from_env() -> Result<Self, HealthzError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HealthzError> {
        let api_version = lookup("NGINX_API_VERSION")
            .map(|v| parse_setting::<u32>("NGINX_API_VERSION", &v))
            .transpose()?;
        let api_timeout = lookup("NGINX_API_TIMEOUT_SECS")
            .map(|v| parse_setting::<u64>("NGINX_API_TIMEOUT_SECS", &v))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8201".into()),
            api_url: lookup("NGINX_API_URL").unwrap_or_else(|| "http://127.0.0.1:8080".into()),
            api_version,
            api_timeout,
        })
    }

    /// Builds the status API client this configuration describes.
    pub fn client(&self) -> Result<Client, HealthzError> {
        let mut builder = Client::builder(self.api_url.as_str());
        if let Some(version) = self.api_version {
            builder = builder.version(version);
        }
        if let Some(timeout) = self.api_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

fn parse_setting<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, HealthzError> {
    value
        .trim()
        .parse()
        .map_err(|_| HealthzError::InvalidSetting {
            name,
            value: value.to_string(),
        })
}

/// Shared application state passed to all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: Client,
}

impl AppState {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}
