//! Data models for the NGINX Plus status API and the summaries built from it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;

/// Health summary for one or more upstreams.
///
/// For a single upstream `up + down == total` always holds. A merged value
/// only counts the upstreams whose fetch succeeded.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub up: usize,
    pub down: usize,
}

impl AddAssign for Stats {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.up += rhs.up;
        self.down += rhs.down;
    }
}

/// One backend server inside an upstream.
///
/// Only `state` drives the health summary. The remaining telemetry is decoded
/// when present and tolerated when absent.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Peer {
    pub id: i64,
    pub server: String,
    pub name: String,
    pub backup: bool,
    pub weight: i64,
    pub state: String,
    pub active: i64,
    pub requests: i64,
    pub header_time: Option<i64>,
    pub response_time: Option<i64>,
    pub sent: i64,
    pub received: i64,
    pub fails: i64,
    pub unavail: i64,
    pub health_checks: Option<HealthChecks>,
    pub downtime: i64,
    pub selected: Option<String>,
}

/// Active health check counters for a peer.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HealthChecks {
    pub checks: i64,
    pub fails: i64,
    pub unhealthy: i64,
    pub last_passed: Option<bool>,
}

/// Response of `GET /api/{version}/http/upstreams/{name}`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UpstreamSnapshot {
    pub peers: Vec<Peer>,
    pub keepalive: i64,
    pub zombies: i64,
    pub zone: String,
}

/// Zone descriptor for one upstream in a `?fields=zone` response.
///
/// Any JSON value decodes; a non-object entry or a non-string `zone` simply
/// leaves `zone` empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneEntry {
    pub zone: Option<String>,
}

impl<'de> Deserialize<'de> for ZoneEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let zone = value
            .get("zone")
            .and_then(|z| z.as_str())
            .map(str::to_string);
        Ok(ZoneEntry { zone })
    }
}

/// Response of `GET /api/{version}/http/upstreams?fields=zone`, keyed by upstream name.
pub type ZoneMap = BTreeMap<String, ZoneEntry>;

/// Upstream names grouped by the hostname their zone encodes.
pub type HostnameUpstreams = HashMap<String, Vec<String>>;

/// Outcome of a best-effort fan-out over several upstreams.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Sum over the upstreams that answered.
    pub stats: Stats,
    /// Upstreams whose fetch failed and were left out of `stats`, sorted.
    pub failed: Vec<String>,
}
