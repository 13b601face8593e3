//! Incoming HTTP request type.

use std::collections::HashMap;

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::method::Method;

/// An incoming HTTP request.
///
/// Only the parts the handlers read are kept: method, path, raw query
/// string, headers, and the path parameters filled in by the router.
/// Request bodies are never read.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    params: HashMap<String, String>,
}

impl Request {
    /// Builds a request from a method and an origin-form URI such as
    /// `/movies/search?q=alien`. Used by the server and by in-process tests.
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (uri, None),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: HeaderMap::new(),
            params: HashMap::new(),
        }
    }

    pub(crate) fn from_parts(method: Method, uri: &http::Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            headers,
            params: HashMap::new(),
        }
    }

    /// Adds a header. Chainable, for building requests in tests.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// The path plus query string, exactly as received.
    pub fn original_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter, percent-decoded.
    ///
    /// For a route `/movies/{id}`, `req.param("id")` on `/movies/tt0111161`
    /// returns `Some("tt0111161")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the first value of a query-string key, form-url-decoded.
    ///
    /// `?q=the+matrix&q=other` gives `Some("the matrix")` for `"q"`.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}
