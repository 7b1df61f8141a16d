use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::error::HealthzError;
use crate::models::{HostnameUpstreams, Stats};
use crate::state::AppState;

/// Routes exposing upstream health over HTTP.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/upstreams/{name}", get(upstream_stats))
        .route("/hosts/{hostname}", get(host_stats))
        .route("/hosts/{hostname}/upstreams", get(host_upstreams))
        .with_state(state)
}

/// Error wrapper that renders as a JSON body with a matching status code.
pub struct ApiError(HealthzError);

impl From<HealthzError> for ApiError {
    fn from(e: HealthzError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.root() {
            HealthzError::EmptyUpstream(_) | HealthzError::NoUpstreamsForHost(_) => {
                StatusCode::NOT_FOUND
            }
            HealthzError::UnexpectedStatus { code: 404, .. } => StatusCode::NOT_FOUND,
            HealthzError::InvalidUpstreamName(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        error!("{}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// GET /healthz - Liveness of this service.
pub async fn healthz() -> &'static str {
    "ok"
}

/// GET /upstreams/{name} - Stats for one upstream.
pub async fn upstream_stats(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.client.stats_for(&name).await?))
}

/// GET /hosts/{hostname} - Stats summed over the host's upstreams.
pub async fn host_stats(
    State(state): State<Arc<AppState>>,
    Path(hostname): Path<String>,
) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.client.stats_for_host(&hostname).await?))
}

/// GET /hosts/{hostname}/upstreams - Upstreams that belong to the host.
pub async fn host_upstreams(
    State(state): State<Arc<AppState>>,
    Path(hostname): Path<String>,
) -> Result<Json<HostnameUpstreams>, ApiError> {
    Ok(Json(state.client.upstreams_for(&hostname).await?))
}
