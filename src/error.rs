//! Error types for the NGINX health client.
//!
//! Errors fall into three groups: configuration errors raised while building a
//! [`Client`](crate::client::Client), transport errors raised by a single call to
//! the status API, and semantic errors raised when a well-formed response does
//! not describe anything useful.

use thiserror::Error;

/// Error type for every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum HealthzError {
    /// Base URL is empty, relative, or not http(s).
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// API version outside the supported set.
    #[error("unsupported NGINX API version: {0}")]
    UnsupportedVersion(u32),

    /// Environment setting that could not be parsed.
    #[error("invalid value {value:?} for {name}")]
    InvalidSetting { name: &'static str, value: String },

    /// The request could not be assembled (malformed URL, bad header).
    #[error("creating request for {url}: {source}")]
    RequestBuild {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The network call itself failed: connection refused, DNS, timeout.
    #[error("sending request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The status API answered with something other than 200 OK.
    #[error("got response code {code} from {url}")]
    UnexpectedStatus { url: String, code: u16 },

    /// The body was not JSON, or not the JSON shape we expected.
    #[error("decoding response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Upstream name that cannot address a single upstream (empty, `.` or `..`).
    #[error("invalid upstream name {0:?}")]
    InvalidUpstreamName(String),

    /// The upstream exists in the response but lists no peers.
    #[error("no servers in upstream {0}")]
    EmptyUpstream(String),

    /// No upstream zone maps to the requested hostname.
    #[error("no stat data for host {0}")]
    NoUpstreamsForHost(String),

    /// A fan-out task panicked or was aborted before producing a result.
    #[error("stats task did not complete: {0}")]
    TaskFailed(String),

    /// Context wrapper naming the upstream a failed call was made for.
    #[error("upstream {upstream}: {source}")]
    Upstream {
        upstream: String,
        #[source]
        source: Box<HealthzError>,
    },

    /// Context wrapper for a failed zone discovery call.
    #[error("retrieving zones: {source}")]
    Zones {
        #[source]
        source: Box<HealthzError>,
    },
}

impl HealthzError {
    /// Returns the classified cause underneath any context wrappers.
    pub fn root(&self) -> &HealthzError {
        match self {
            HealthzError::Upstream { source, .. } | HealthzError::Zones { source } => source.root(),
            other => other,
        }
    }

    /// True when the failure happened below the HTTP application layer.
    pub fn is_transport(&self) -> bool {
        matches!(self.root(), HealthzError::Transport { .. })
    }

    pub(crate) fn for_upstream(upstream: &str, source: HealthzError) -> Self {
        HealthzError::Upstream {
            upstream: upstream.to_string(),
            source: Box::new(source),
        }
    }
}
