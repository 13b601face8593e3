//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Static segments win over
//! parameters, so `/movies/search` and `/movies/{id}` coexist.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use tracing::error;

use crate::error::ApiError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Cors, trace};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The application router.
///
/// Owns the route table, the shared state handed to every handler, and the
/// optional CORS policy. Build it once at startup; pass it to
/// [`Server::serve`](crate::Server::serve). Each registration returns `self`
/// so calls chain naturally.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    state: S,
    cors: Option<Cors>,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(state: S) -> Self {
        Self { routes: HashMap::new(), state, cors: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax and `{*name}` for a catch-all:
    ///
    /// ```rust,no_run
    /// # use marquee::{Method, Request, Response, Router};
    /// # async fn detail(_: Request, _: ()) -> Response { Response::text("") }
    /// Router::new(()).on(Method::Get, "/movies/{id}", detail);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an existing route.
    pub fn on(self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Shorthand for `on(Method::Get, ..)`.
    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Get, path, handler)
    }

    /// Register one handler for every known method.
    pub fn any(mut self, path: &str, handler: impl Handler<S>) -> Self {
        let handler = handler.into_boxed_handler();
        for method in Method::ALL {
            self = self.add(method, path, Arc::clone(&handler));
        }
        self
    }

    /// Apply `cors` to every response, including errors and 404s.
    pub fn cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), percent_decode_str(v).decode_utf8_lossy().into_owned()))
            .collect();
        Some((handler, params))
    }

    /// Produces the response for one request.
    ///
    /// Unmatched paths get a `404` naming the path; a panicking handler gets
    /// the generic `500`. The CORS policy, if any, applies to both.
    pub async fn handle(&self, req: Request) -> Response {
        let method = req.method();
        let path = req.path().to_owned();
        trace::record(method.as_str(), &path, async move {
            if let Some(cors) = &self.cors {
                if cors.is_preflight(&req) {
                    return cors.preflight();
                }
            }
            let mut response = self.route(req).await;
            if method == Method::Head {
                response.clear_body();
            }
            self.finish(response)
        })
        .await
    }

    /// The `405` for a method token outside [`Method`], logged and stamped
    /// with CORS like any routed response.
    pub(crate) async fn reject_method(&self, method: &str, path: &str) -> Response {
        trace::record(method, path, async {
            self.finish(ApiError::method_not_allowed(method).into_response())
        })
        .await
    }

    fn finish(&self, mut response: Response) -> Response {
        if let Some(cors) = &self.cors {
            cors.apply(&mut response);
        }
        response
    }

    async fn route(&self, mut req: Request) -> Response {
        let path = trim_trailing_slash(req.path());
        let found = match self.lookup(req.method(), path) {
            None if req.method() == Method::Head => self.lookup(Method::Get, path),
            found => found,
        };
        let Some((handler, params)) = found else {
            return ApiError::not_found(format!("Can't find {} on this server!", req.original_uri()))
                .into_response();
        };
        req.set_params(params);

        match AssertUnwindSafe(handler.call(req, self.state.clone())).catch_unwind().await {
            Ok(response) => response,
            Err(_) => {
                error!("handler panicked");
                ApiError::internal().into_response()
            }
        }
    }
}

/// `/movies/` routes like `/movies`. Only one slash is dropped, and never
/// the root's.
fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
