//! Cross-origin resource sharing.
//!
//! The service is called straight from browsers on other origins, so every
//! response carries `access-control-allow-origin`, and preflight `OPTIONS`
//! requests are answered here without reaching a handler.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_METHOD, HeaderValue,
};
use http::StatusCode;

use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// CORS policy applied by the router.
#[derive(Clone, Debug)]
pub struct Cors {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl Cors {
    /// Any origin; `GET, POST, PUT, DELETE, PATCH`; `Content-Type, Authorization`.
    pub fn permissive() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_methods: HeaderValue::from_static("GET, POST, PUT, DELETE, PATCH"),
            allow_headers: HeaderValue::from_static("Content-Type, Authorization"),
        }
    }

    /// Replaces the allowed origin.
    pub fn allow_origin(mut self, origin: HeaderValue) -> Self {
        self.allow_origin = origin;
        self
    }

    /// An `OPTIONS` request naming the method it intends to send.
    pub fn is_preflight(&self, req: &Request) -> bool {
        req.method() == Method::Options && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
    }

    /// `204 No Content` with the full set of allow headers.
    pub fn preflight(&self) -> Response {
        let mut res = Response::status(StatusCode::NO_CONTENT);
        res.insert_header(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        res.insert_header(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        self.apply(&mut res);
        res
    }

    /// Stamps the allowed origin onto an outgoing response.
    pub fn apply(&self, res: &mut Response) {
        res.insert_header(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
    }
}

impl Default for Cors {
    fn default() -> Self { Self::permissive() }
}
