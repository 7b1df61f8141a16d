//! Client for the NGINX Plus upstream status API.

use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::aggregate::fan_out;
use crate::error::HealthzError;
use crate::models::{AggregateReport, HostnameUpstreams, Stats, UpstreamSnapshot, ZoneMap};
use crate::transport::get_json;
use crate::{upstream, zones};

/// API versions the client knows how to talk to.
pub const SUPPORTED_API_VERSIONS: &[u32] = &[4, 5, 6, 7, 8];

/// Version used when none is configured.
pub const DEFAULT_API_VERSION: u32 = 8;

/// Per-request deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to one status API endpoint.
///
/// Cloning is cheap and clones share the same connection pool. Configuration
/// is fixed once built, so one client can serve many callers at once.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    base_url: String,
    base: Url,
    version: u32,
    timeout: Duration,
    http: reqwest::Client,
}

/// Validating builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    options: Vec<ClientOption>,
}

#[derive(Debug)]
enum ClientOption {
    Version(u32),
    Timeout(Duration),
    HttpClient(reqwest::Client),
}

impl ClientBuilder {
    /// Selects the API version; must be one of [`SUPPORTED_API_VERSIONS`].
    pub fn version(mut self, version: u32) -> Self {
        self.options.push(ClientOption::Version(version));
        self
    }

    /// Overrides the per-request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.push(ClientOption::Timeout(timeout));
        self
    }

    /// Replaces the underlying HTTP client, e.g. to share a pool or set proxies.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.options.push(ClientOption::HttpClient(http));
        self
    }

    /// Validates the base URL, then applies options in the order they were
    /// given, stopping at the first invalid one.
    pub fn build(self) -> Result<Client, HealthzError> {
        let base = validate_base_url(&self.base_url)?;
        let base_url = self.base_url.trim_end_matches('/').to_string();

        let mut version = DEFAULT_API_VERSION;
        let mut timeout = DEFAULT_TIMEOUT;
        let mut http = None;
        for option in self.options {
            match option {
                ClientOption::Version(v) => {
                    if !SUPPORTED_API_VERSIONS.contains(&v) {
                        return Err(HealthzError::UnsupportedVersion(v));
                    }
                    version = v;
                }
                ClientOption::Timeout(t) => timeout = t,
                ClientOption::HttpClient(h) => http = Some(h),
            }
        }

        Ok(Client {
            inner: Arc::new(Inner {
                base_url,
                base,
                version,
                timeout,
                http: http.unwrap_or_default(),
            }),
        })
    }
}

fn validate_base_url(raw: &str) -> Result<Url, HealthzError> {
    let invalid = |reason: &str| HealthzError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.trim().is_empty() {
        return Err(invalid("empty"));
    }
    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(url)
}

impl Client {
    /// Starts a builder for the status API at `base_url`, e.g. `http://127.0.0.1:8080`.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.into(),
            options: Vec::new(),
        }
    }

    /// Client with default version and timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, HealthzError> {
        Self::builder(base_url).build()
    }

    /// Base URL as configured, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// API version used in every request path.
    pub fn version(&self) -> u32 {
        self.inner.version
    }

    /// Deadline applied to each request.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// `{base}/api/{version}/http/upstreams`, plus `name` as one escaped segment.
    fn upstreams_url(&self, name: Option<&str>) -> Url {
        let mut url = self.inner.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        let version = self.inner.version.to_string();
        // The base was checked to be a hierarchical URL, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", version.as_str(), "http", "upstreams"]);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        url
    }

    /// Fetches one upstream and reduces its peers to [`Stats`].
    ///
    /// Errors are wrapped with the upstream name.
    pub async fn stats_for(&self, name: &str) -> Result<Stats, HealthzError> {
        if matches!(name, "" | "." | "..") {
            return Err(HealthzError::InvalidUpstreamName(name.to_string()));
        }
        let url = self.upstreams_url(Some(name));
        let snapshot: UpstreamSnapshot =
            get_json(&self.inner.http, url.as_str(), self.inner.timeout)
                .await
                .map_err(|e| HealthzError::for_upstream(name, e))?;
        upstream::stats_for(name, &snapshot)
    }

    /// Finds the upstreams whose zone belongs to `hostname`.
    ///
    /// No match gives an empty map, not an error.
    pub async fn upstreams_for(&self, hostname: &str) -> Result<HostnameUpstreams, HealthzError> {
        let mut url = self.upstreams_url(None);
        url.set_query(Some("fields=zone"));
        let zone_map: ZoneMap = get_json(&self.inner.http, url.as_str(), self.inner.timeout)
            .await
            .map_err(|e| HealthzError::Zones {
                source: Box::new(e),
            })?;
        let grouped = zones::upstreams_for_host(hostname, &zone_map);
        debug!(
            "host {}: {} of {} upstreams match",
            hostname,
            grouped.get(hostname).map_or(0, Vec::len),
            zone_map.len()
        );
        Ok(grouped)
    }

    /// Sums stats across every upstream that belongs to `hostname`.
    ///
    /// Only zone discovery errors and an unknown hostname are reported;
    /// individual upstream failures are dropped as in
    /// [`stats_for_upstreams`](Self::stats_for_upstreams).
    pub async fn stats_for_host(&self, hostname: &str) -> Result<Stats, HealthzError> {
        Ok(self.aggregate_host(hostname).await?.stats)
    }

    /// Like [`stats_for_host`](Self::stats_for_host) but also names the
    /// upstreams that were left out.
    pub async fn aggregate_host(&self, hostname: &str) -> Result<AggregateReport, HealthzError> {
        let mut grouped = self.upstreams_for(hostname).await?;
        let names = grouped
            .remove(hostname)
            .ok_or_else(|| HealthzError::NoUpstreamsForHost(hostname.to_string()))?;
        Ok(self.aggregate_upstreams(names).await)
    }

    /// Sums stats over `upstreams`, fetched concurrently. Never fails:
    /// upstreams that cannot be fetched contribute nothing.
    pub async fn stats_for_upstreams<I>(&self, upstreams: I) -> Stats
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.aggregate_upstreams(upstreams).await.stats
    }

    /// Like [`stats_for_upstreams`](Self::stats_for_upstreams) but also names
    /// the upstreams that were left out.
    pub async fn aggregate_upstreams<I>(&self, upstreams: I) -> AggregateReport
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        fan_out(upstreams, |name| {
            let client = self.clone();
            async move { client.stats_for(&name).await }
        })
        .await
    }
}
