//! Hostname discovery from upstream zone names.
//!
//! Zones follow the convention `<hostname>-<rest>`, e.g. the zone
//! `bar.example.org-lxr-backend` belongs to host `bar.example.org`.

use crate::models::{HostnameUpstreams, ZoneMap};

/// Returns the hostname encoded in `zone`: everything before the first `-`,
/// or the whole zone when it has none.
pub fn hostname_from_zone(zone: &str) -> &str {
    zone.split_once('-').map_or(zone, |(host, _)| host)
}

/// Groups the upstreams of `zones` whose zone hostname equals `hostname`.
///
/// Returns an empty map when nothing matches. Entries without a usable zone
/// string are skipped.
pub fn upstreams_for_host(hostname: &str, zones: &ZoneMap) -> HostnameUpstreams {
    let mut grouped = HostnameUpstreams::new();
    for (upstream, entry) in zones {
        let Some(zone) = entry.zone.as_deref() else {
            continue;
        };
        let host = hostname_from_zone(zone);
        if host != hostname {
            continue;
        }
        grouped
            .entry(host.to_string())
            .or_default()
            .push(upstream.clone());
    }
    grouped
}
