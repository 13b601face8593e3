//! Client for the upstream movie-data API.
//!
//! One call is one outbound `GET {base_url}/{endpoint}?{params}` carrying the
//! credential headers, bounded by the configured timeout, never retried. The
//! outcome is either the decoded JSON payload or an [`ApiError`] classified
//! as follows:
//!
//! | Outcome | Status | Message |
//! |---|---|---|
//! | no credential configured | 500 | `API_KEY is not defined in environment variables` |
//! | timed out | 504 | `Failed to connect to upstream` |
//! | any other transport failure | 502 | `Failed to connect to upstream` |
//! | non-2xx | upstream's | body `message`, else `error`, else `Upstream request failed` |
//! | 2xx, body has a truthy `error` | 400 | that `error` |
//! | 2xx, empty or falsy body (`null`, `false`, `0`, `""`) | 404 | `No data returned from upstream` |
//! | 2xx, body is not JSON | 502 | `Upstream returned an invalid response` |

use http::StatusCode;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::UpstreamConfig;
use crate::error::{ApiError, Error};

pub const MISSING_CREDENTIAL: &str = "API_KEY is not defined in environment variables";
pub const UNREACHABLE: &str = "Failed to connect to upstream";
pub const NO_DATA: &str = "No data returned from upstream";
pub const REQUEST_FAILED: &str = "Upstream request failed";
pub const INVALID_RESPONSE: &str = "Upstream returned an invalid response";

const KEY_HEADER: &str = "X-RapidAPI-Key";
const HOST_HEADER: &str = "X-RapidAPI-Host";

/// Outbound client. Cheap to share behind an `Arc`; holds a pooled
/// `reqwest::Client` and the immutable [`UpstreamConfig`].
#[derive(Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    pub fn has_credential(&self) -> bool {
        self.config.credential().is_some()
    }

    /// Calls `endpoint` with `params` as the query string.
    pub async fn call(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, ApiError> {
        let Some(credential) = self.config.credential() else {
            return Err(ApiError::configuration(MISSING_CREDENTIAL));
        };

        let url = self.config.endpoint_url(endpoint);
        debug!(endpoint, ?params, "calling upstream");

        let response = self
            .http
            .get(&url)
            .query(params)
            .header(KEY_HEADER, credential.expose())
            .header(HOST_HEADER, self.config.host())
            .send()
            .await
            .map_err(|e| unreachable_upstream(endpoint, &e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| unreachable_upstream(endpoint, &e))?;

        if !status.is_success() {
            return Err(rejected(endpoint, status, &body));
        }
        accepted(endpoint, &body)
    }
}

fn unreachable_upstream(endpoint: &str, err: &reqwest::Error) -> ApiError {
    error!(endpoint, timeout = err.is_timeout(), "upstream unreachable: {err}");
    let status = if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };
    ApiError::upstream(status, UNREACHABLE)
}

/// Non-2xx: mirror the status, lift a message out of the body if there is one.
fn rejected(endpoint: &str, status: StatusCode, body: &[u8]) -> ApiError {
    let payload: Option<Value> = serde_json::from_slice(body).ok();
    let message = payload
        .as_ref()
        .and_then(|p| field_text(p, "message").or_else(|| field_text(p, "error")))
        .unwrap_or_else(|| REQUEST_FAILED.to_owned());
    warn!(endpoint, status = status.as_u16(), "upstream rejected request: {message}");
    ApiError::upstream(status, message)
}

/// 2xx: decode, then look for an in-band error or a missing payload.
fn accepted(endpoint: &str, body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::not_found(NO_DATA));
    }

    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        warn!(endpoint, "upstream sent a non-JSON body: {e}");
        ApiError::upstream(StatusCode::BAD_GATEWAY, INVALID_RESPONSE)
    })?;

    if let Some(message) = field_text(&payload, "error") {
        return Err(ApiError::upstream_logic(message));
    }
    if truthy_text(&payload).is_none() {
        return Err(ApiError::not_found(NO_DATA));
    }
    Ok(payload)
}

/// `payload[key]` as display text, if present and truthy.
fn field_text(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(truthy_text)
}

/// Falsy values (`null`, `false`, `0`, `""`) yield nothing; strings are
/// taken verbatim; anything else is rendered as compact JSON.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
