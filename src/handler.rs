//! Route handlers.
//!
//! The router keeps handlers of many concrete types in one table, so each is
//! stored as `Arc<dyn Handler>` and called through one vtable dispatch per
//! request. Any `Fn(Request) -> impl Future<Output = impl IntoResponse>` is a
//! handler, which covers both plain `async fn`s and the closures
//! [`Endpoint::register`](crate::Endpoint::register) builds for resource
//! routes (those resolve to `Result<Response, Error>`).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A boxed future resolving to the [`Response`] for one request.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

pub(crate) type BoxedHandler = Arc<dyn Handler>;

/// Something that answers a routed request.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = self(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
