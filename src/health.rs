//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve movie requests? Failure → pulled from load-balancer. |

use http::StatusCode;

use crate::app::AppState;
use crate::error::{ApiError, ErrorKind};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::upstream::MISSING_CREDENTIAL;

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request, _state: AppState) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` once an upstream credential is configured.
/// Without one every movie request would fail, so report `503`.
pub async fn readiness(_req: Request, state: AppState) -> Response {
    if state.upstream().has_credential() {
        Response::text("ready")
    } else {
        ApiError::new(ErrorKind::Configuration, StatusCode::SERVICE_UNAVAILABLE, MISSING_CREDENTIAL)
            .into_response()
    }
}
