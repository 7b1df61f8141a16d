//! Reduction of one upstream snapshot to a [`Stats`] value.

use crate::error::HealthzError;
use crate::models::{Peer, Stats, UpstreamSnapshot};

/// Peer state that counts as healthy. Every other state counts as down.
pub const STATE_UP: &str = "up";

/// Counts peers in `snapshot`.
///
/// An upstream without peers is reported as [`HealthzError::EmptyUpstream`]
/// rather than as zero stats; it usually means the name was wrong.
pub fn stats_for(upstream: &str, snapshot: &UpstreamSnapshot) -> Result<Stats, HealthzError> {
    if snapshot.peers.is_empty() {
        return Err(HealthzError::EmptyUpstream(upstream.to_string()));
    }
    Ok(count_peers(&snapshot.peers))
}

fn count_peers(peers: &[Peer]) -> Stats {
    let total = peers.len();
    let up = peers.iter().filter(|p| p.state == STATE_UP).count();
    Stats {
        total,
        up,
        down: total - up,
    }
}
