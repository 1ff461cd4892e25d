//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()` — no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{Full, LengthLimitError};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::{self, Config, DEFAULT_BODY_LIMIT};
use crate::error::Error;
use crate::request::{BoxError, Request};
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    body_limit: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// Fails with [`Error::Configuration`] if `addr` is not a `host:port`
    /// socket address.
    ///
    /// ```rust
    /// use resourceful::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self { addr: config::parse_addr(addr)?, body_limit: DEFAULT_BODY_LIMIT })
    }

    pub fn from_config(config: &Config) -> Self {
        Self { addr: config.addr, body_limit: config.body_limit }
    }

    /// Caps the request body size; larger bodies are answered with `413`.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);
        let mut connections = JoinSet::new();

        info!(addr = %self.addr, body_limit = self.body_limit, "resourceful listening");

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown wins over queued connections.
                biased;

                () = &mut shutdown => break,

                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(connection(Arc::clone(&router), stream, peer, self.body_limit));
                    }
                    Err(e) => error!("accept error: {e}"),
                },

                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        info!(in_flight = connections.len(), "shutdown signal received, draining connections");
        while connections.join_next().await.is_some() {}

        info!("resourceful stopped");
        Ok(())
    }
}

/// Serves every request of one connection, HTTP/1.1 or HTTP/2.
async fn connection(router: Arc<Router>, stream: TcpStream, peer: SocketAddr, body_limit: usize) {
    let svc = service_fn(move |req| {
        let router = Arc::clone(&router);
        async move { dispatch(&router, req, peer, body_limit).await }
    });

    let served = ConnBuilder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(stream), svc)
        .await;
    if let Err(e) = served {
        error!(%peer, "connection error: {e}");
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers one hyper request, routes it and converts the answer back.
///
/// Every failure becomes a status response, so hyper never sees an error:
/// `405` for a method token [`Method`](crate::Method) does not know, `413`
/// for a body over `body_limit`, `400` for any other body read failure.
async fn dispatch<B>(
    router: &Router,
    req: hyper::Request<B>,
    peer: SocketAddr,
    body_limit: usize,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: Into<BoxError>,
{
    let response = match Request::from_hyper(req, body_limit).await {
        Ok(Some(req)) => router.handle(req).await,
        Ok(None) => Response::status(StatusCode::METHOD_NOT_ALLOWED),
        Err(e) if e.is::<LengthLimitError>() => {
            debug!(%peer, body_limit, "request body too large");
            Response::status(StatusCode::PAYLOAD_TOO_LARGE)
        }
        Err(e) => {
            debug!(%peer, "failed to read request body: {e}");
            Response::status(StatusCode::BAD_REQUEST)
        }
    };

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C only on Windows).
///
/// A handler that fails to install is logged and that arm never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
