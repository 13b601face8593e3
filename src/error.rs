//! Error types.
//!
//! [`Error`] surfaces infrastructure failures: binding a port, reading
//! configuration, building the outbound HTTP client. Nothing a caller sends
//! can produce one.
//!
//! [`ApiError`] is what a request handler returns when it cannot produce a
//! success envelope. It always carries the HTTP status to answer with and a
//! message that is safe to show the caller, and it renders itself as
//!
//! ```json
//! { "status": "fail", "message": "Search query must be at least 2 characters long" }
//! ```
//!
//! `"fail"` for 4xx, `"error"` for 5xx.

use http::StatusCode;
use serde::Serialize;

use crate::response::{IntoResponse, Response};

/// The error type returned by marquee's fallible startup operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration: {0}")]
    Config(String),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

// ── ApiError ──────────────────────────────────────────────────────────────────

/// Where an [`ApiError`] came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Caller input was malformed.
    Validation,
    /// The requested resource does not exist.
    NotFound,
    /// The upstream answered 2xx but reported an error in its body.
    UpstreamLogic,
    /// The upstream answered non-2xx, or could not be reached at all.
    UpstreamTransport,
    /// The service is missing configuration it needs to serve the request.
    Configuration,
    /// The request method is not one the server understands.
    MethodNotAllowed,
    /// Anything else. Never carries details of the underlying fault.
    Internal,
}

/// How the `status` field of a rendered error body reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Label {
    Fail,
    Error,
}

impl Label {
    fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

/// A classified request failure: one message, one HTTP status.
///
/// Created where the failure happens, returned up through the handler and
/// rendered once at the boundary.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    status: StatusCode,
    message: String,
    label: Option<Label>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: StatusCode, message: impl Into<String>) -> Self {
        Self { kind, status, message: message.into(), label: None }
    }

    /// `400`: caller input rejected before anything else happens.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, StatusCode::BAD_REQUEST, message)
    }

    /// `404`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, StatusCode::NOT_FOUND, message)
    }

    /// `400`: the upstream reported `{ "error": ... }` on a 2xx.
    pub fn upstream_logic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamLogic, StatusCode::BAD_REQUEST, message)
    }

    /// Upstream transport failure with the status to answer with.
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamTransport, status, message)
    }

    /// `500`: required configuration is absent.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// `405` for a method token the server does not recognise.
    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(
            ErrorKind::MethodNotAllowed,
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method {method} is not allowed"),
        )
    }

    /// Generic `500`. The real cause belongs in the log, not the response.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE)
    }

    /// Render with `"status": "error"` regardless of the status code.
    pub fn labelled_error(mut self) -> Self {
        self.label = Some(Label::Error);
        self
    }

    pub fn kind(&self) -> ErrorKind { self.kind }
    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> &str { &self.message }

    fn label(&self) -> Label {
        match self.label {
            Some(label) => label,
            None if self.status.is_client_error() => Label::Fail,
            None => Label::Error,
        }
    }
}

const GENERIC_MESSAGE: &str = "Something went wrong";

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { status: self.label().as_str(), message: &self.message };
        Response::builder().status(self.status).json(&body)
    }
}

/// Pre-rendered body for the generic 500, used when serialising anything
/// else has already failed.
pub(crate) const GENERIC_BODY: &[u8] = br#"{"status":"error","message":"Something went wrong"}"#;
