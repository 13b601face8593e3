//! Route table and shared application state.

use std::sync::Arc;

use crate::middleware::Cors;
use crate::request::Request;
use crate::router::Router;
use crate::upstream::UpstreamClient;
use crate::{health, movies};

/// State handed to every handler. Cloning is one `Arc` increment.
#[derive(Clone, Debug)]
pub struct AppState {
    upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream: Arc::new(upstream) }
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }
}

/// The complete service: movie endpoints, health probes, the `/videos`
/// placeholder, permissive CORS, and a JSON 404 for everything else.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new(state)
        .cors(Cors::permissive())
        .get("/movies", movies::list)
        .get("/movies/search", movies::search)
        .get("/movies/{id}", movies::detail)
        .any("/videos", videos)
        .any("/videos/{*rest}", videos)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}

async fn videos(_req: Request, _state: AppState) -> &'static str {
    "Videos endpoint"
}
