//! Per-request tracing span.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::response::Response;

/// Runs `fut` inside a `request` span and logs its outcome.
pub(crate) async fn record<F>(method: &str, path: &str, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", %method, path);
    async move {
        let started = Instant::now();
        let response = fut.await;
        info!(
            status = response.status_code().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed",
        );
        response
    }
    .instrument(span)
    .await
}
