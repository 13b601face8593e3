//! # marquee
//!
//! A thin JSON proxy in front of a third-party movie-data API.
//!
//! ## The contract
//!
//! Callers get three read-only endpoints and a uniform envelope:
//!
//! | Route | Success body |
//! |---|---|
//! | `GET /movies?page=N` | `{status, page, query_used, results, data[]}` |
//! | `GET /movies/search?q=text` | `{status, results, data[]}` |
//! | `GET /movies/{id}` | `{status, data}` |
//!
//! Every failure, whether bad input, upstream error, or an unknown path, is
//! an [`ApiError`] rendered as `{status: "fail" | "error", message}` with the
//! matching HTTP status. Nothing is cached, retried, or stored.
//!
//! ## Layout
//!
//! - [`upstream`]: the outbound client and its error classification
//! - [`movies`]: input validation and envelope shaping
//! - [`Router`], [`Server`], [`middleware`]: the small hyper-based HTTP layer
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use marquee::{AppState, Config, Server, UpstreamClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), marquee::Error> {
//!     let config = Config::load()?;
//!     let client = UpstreamClient::new(config.upstream()?)?;
//!     let app = marquee::app::router(AppState::new(client));
//!     Server::bind(&config.bind)?.serve(app).await
//! }
//! ```

mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod config;
pub mod error;
pub mod health;
pub mod logger;
pub mod middleware;
pub mod movies;
pub mod upstream;

pub use app::AppState;
pub use config::{Config, Credential, UpstreamConfig};
pub use error::{ApiError, Error, ErrorKind};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use upstream::UpstreamClient;
