//! Best-effort fan-out over many upstreams.

use std::collections::HashMap;
use std::future::Future;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::HealthzError;
use crate::models::{AggregateReport, Stats};

/// Runs `fetch` for every name on its own task and sums what comes back.
///
/// All names are launched at once. A failed fetch adds nothing to the totals
/// and is listed in [`AggregateReport::failed`]; it never fails the call.
/// Returns once every task has finished. Dropping the returned future aborts
/// all tasks still in flight.
pub async fn fan_out<I, F, Fut>(names: I, fetch: F) -> AggregateReport
where
    I: IntoIterator,
    I::Item: Into<String>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Stats, HealthzError>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut pending_names = HashMap::new();
    for name in names {
        let name: String = name.into();
        let pending = fetch(name.clone());
        let id = tasks.spawn(pending).id();
        pending_names.insert(id, name);
    }

    let mut report = AggregateReport::default();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => (e.id(), Err(HealthzError::TaskFailed(e.to_string()))),
        };
        let Some(name) = pending_names.remove(&id) else {
            continue;
        };
        match outcome {
            Ok(stats) => {
                debug!("upstream {}: {:?}", name, stats);
                report.stats += stats;
            }
            Err(e) => {
                warn!("dropping upstream {} from aggregate: {}", name, e);
                report.failed.push(name);
            }
        }
    }
    report.failed.sort();
    report
}
