//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Resources register their
//! conventional routes here through [`Router::resource`]; anything else can be
//! added by hand next to them.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::resource::{Endpoint, Resource};
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `:name` (or `matchit`'s native `{name}`) syntax;
    /// `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` conflicts with a route already registered for `method`.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Delete, path, handler)
    }

    /// Mounts the conventional routes of a resource.
    pub fn resource<R: Resource>(self, endpoint: Endpoint<R>) -> Self {
        endpoint.register(self)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let path = matchit_path(path);
        self.routes
            .entry(method)
            .or_default()
            .insert(path.as_str(), Arc::new(handler) as BoxedHandler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one request and produces one response.
    ///
    /// Unmatched requests get `404 Not Found`.
    pub async fn handle(&self, mut req: Request) -> Response {
        let method = req.method();
        let Some((handler, params)) = self.lookup(method, req.path()) else {
            debug!(%method, path = req.path(), "no route");
            return Response::status(StatusCode::NOT_FOUND);
        };
        req.params = params;
        let path = req.path().to_owned();
        let res = handler.call(req).await;
        debug!(%method, %path, status = %res.status_code(), "routed");
        res
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Rewrites `:name` segments into `{name}`, the syntax `matchit` understands.
fn matchit_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
