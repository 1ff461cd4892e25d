//! # resourceful
//!
//! Convention-based REST resources over HTTP.
//!
//! Give a resource a name and the handful of actions it supports; resourceful
//! registers the conventional routes, negotiates between JSON and HTML, and
//! decorates every representation with the hypermedia links a client needs to
//! take the next step.
//!
//! ## The conventions
//!
//! For a resource named `widget`:
//!
//! | Route                   | Action   | Answer                         |
//! |-------------------------|----------|--------------------------------|
//! | `GET  /widgets`         | `list`   | negotiated representation      |
//! | `GET  /widget/new`      | `new`    | negotiated representation      |
//! | `GET  /widget/edit/:id` | `edit`   | negotiated representation      |
//! | `POST /widget`          | `create` | `302` to `/widget/<id>`        |
//! | `GET  /widget/:id`      | `show`   | negotiated representation      |
//! | `PUT  /widget/:id`      | `update` | `302` to `/widget/<id>`        |
//!
//! What resourceful leaves to you: persistence, authentication, validation,
//! and the templates behind `text/html` (plug in a [`ViewEngine`]).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use resourceful::{Config, Endpoint, Error, Resource, Router, Server};
//! use serde_json::{json, Map, Value};
//!
//! struct Widgets;
//!
//! #[async_trait]
//! impl Resource for Widgets {
//!     async fn list(&self, _limit: Option<u64>, _offset: Option<u64>) -> Result<Value, Error> {
//!         Ok(json!([{ "id": 1 }, { "id": 2 }]))
//!     }
//!
//!     async fn show(&self, id: &str) -> Result<Value, Error> {
//!         match id {
//!             "1" | "2" => Ok(json!({ "id": id })),
//!             _ => Err(Error::not_found(format!("no widget {id}"))),
//!         }
//!     }
//!
//!     async fn create(&self, _properties: Map<String, Value>) -> Result<String, Error> {
//!         Ok("3".to_owned())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = Router::new().resource(Endpoint::new("widget", Widgets)?);
//!     Server::from_config(&Config::from_env()?).serve(app).await
//! }
//! ```

mod config;
mod error;
mod format;
mod handler;
mod inflect;
mod link;
mod method;
mod negotiate;
mod request;
mod resource;
mod response;
mod router;
mod server;

pub use config::Config;
pub use error::Error;
pub use format::{Format, Html, Json, Renderer, RendererTable, ViewEngine, APPLICATION_JSON, TEXT_HTML};
pub use handler::{BoxFuture, Handler};
pub use http::StatusCode;
pub use inflect::{English, Inflector};
pub use link::{route_prefix, Link, LinkBuilder};
pub use method::Method;
pub use negotiate::{AcceptNegotiator, Negotiator};
pub use request::{Request, RequestBuilder};
pub use resource::{Action, Endpoint, EndpointBuilder, Resource};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
