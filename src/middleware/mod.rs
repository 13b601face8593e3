//! Middleware layer.
//!
//! Cross-cutting concerns applied by [`Router::handle`](crate::Router::handle)
//! around every request, matched or not:
//!
//! - [`cors`]: preflight answers and `access-control-*` response headers
//! - [`trace`]: per-request span with method, path, status, latency

pub mod cors;
pub(crate) mod trace;

pub use cors::Cors;
