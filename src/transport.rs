//! Single GET against the status API, decoded into a typed value.

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::HealthzError;

/// Issues a GET to `url` with a per-request deadline and decodes a 200 JSON body.
///
/// The body is read to the end on every path that gets a response, so the
/// connection can go back to the pool. The status is checked first; a non-200
/// body is drained best-effort and never masks the status code.
///
/// # Errors
///
/// * `RequestBuild` if the URL cannot be turned into a request
/// * `Transport` if sending or reading fails (including the deadline)
/// * `UnexpectedStatus` if the status is not 200
/// * `Decode` if the body does not match `T`
pub async fn get_json<T>(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<T, HealthzError>
where
    T: DeserializeOwned,
{
    let request = http
        .get(url)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .timeout(timeout)
        .build()
        .map_err(|source| HealthzError::RequestBuild {
            url: url.to_string(),
            source,
        })?;

    debug!("GET {}", url);
    let response = http
        .execute(request)
        .await
        .map_err(|source| transport(url, source))?;

    let status = response.status();
    if status != StatusCode::OK {
        let _ = response.bytes().await;
        return Err(HealthzError::UnexpectedStatus {
            url: url.to_string(),
            code: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| transport(url, source))?;

    serde_json::from_slice(&body).map_err(|source| HealthzError::Decode {
        url: url.to_string(),
        source,
    })
}

fn transport(url: &str, source: reqwest::Error) -> HealthzError {
    HealthzError::Transport {
        url: url.to_string(),
        source,
    }
}
