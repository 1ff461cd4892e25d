//! Resources: conventional routes, negotiated rendering, hypermedia links.
//!
//! Implement [`Resource`] for the actions you support, wrap it in an
//! [`Endpoint`], and mount it:
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use resourceful::{Endpoint, Error, Resource, Router, Server};
//! use serde_json::{json, Value};
//!
//! struct Widgets;
//!
//! #[async_trait]
//! impl Resource for Widgets {
//!     async fn show(&self, id: &str) -> Result<Value, Error> {
//!         Ok(json!({ "id": id, "color": "red" }))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = Router::new().resource(Endpoint::new("widget", Widgets)?);
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```
//!
//! `GET /widget/7` now answers with the entity plus a `links` object
//! advertising `new`, `create`, `list`, `update`, `destroy` and `show`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::format::{Format, RendererTable, ViewEngine};
use crate::inflect::{English, Inflector};
use crate::link::{Link, LinkBuilder};
use crate::negotiate::{AcceptNegotiator, Negotiator};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The named action serving a request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    List,
    New,
    Edit,
    Create,
    Show,
    Update,
    Destroy,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List    => "list",
            Self::New     => "new",
            Self::Edit    => "edit",
            Self::Create  => "create",
            Self::Show    => "show",
            Self::Update  => "update",
            Self::Destroy => "destroy",
        }
    }
}

/// The actions of a resource.
///
/// Every method has a default that fails with [`Error::NotImplemented`]
/// naming itself; override the ones the resource supports.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    async fn list(&self, _limit: Option<u64>, _offset: Option<u64>) -> Result<Value, Error> {
        Err(Error::not_implemented("list"))
    }

    async fn show(&self, _id: &str) -> Result<Value, Error> {
        Err(Error::not_implemented("show"))
    }

    async fn edit(&self, _id: &str) -> Result<Value, Error> {
        Err(Error::not_implemented("edit"))
    }

    async fn update(&self, _id: &str, _properties: Map<String, Value>) -> Result<(), Error> {
        Err(Error::not_implemented("update"))
    }

    /// Backs the `new` route: the blank (or prefilled) entity a creation
    /// form starts from.
    async fn new_entity(&self, _properties: Map<String, Value>) -> Result<Value, Error> {
        Err(Error::not_implemented("new"))
    }

    /// Returns the id of the created entity.
    async fn create(&self, _properties: Map<String, Value>) -> Result<String, Error> {
        Err(Error::not_implemented("create"))
    }

    async fn destroy(&self, _id: &str) -> Result<(), Error> {
        Err(Error::not_implemented("destroy"))
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// A [`Resource`] bound to its name, links, formats and negotiator.
///
/// Cheap to clone; every route registered by [`Endpoint::register`] holds a
/// clone.
pub struct Endpoint<R> {
    inner: Arc<Inner<R>>,
}

struct Inner<R> {
    resource: R,
    name: String,
    links: LinkBuilder,
    format: Format,
    negotiator: Arc<dyn Negotiator>,
}

impl<R> Clone for Endpoint<R> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<R: Resource> Endpoint<R> {
    /// An endpoint with the default collaborators: no view engine,
    /// [`AcceptNegotiator`] and [`English`] pluralization.
    pub fn new(name: impl Into<String>, resource: R) -> Result<Self, Error> {
        Self::builder(name, resource).build()
    }

    pub fn builder(name: impl Into<String>, resource: R) -> EndpointBuilder<R> {
        EndpointBuilder {
            name: name.into(),
            resource,
            view_engine: None,
            negotiator: Arc::new(AcceptNegotiator),
            inflector: Arc::new(English),
            tables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str { &self.inner.name }
    pub fn route_prefix(&self) -> &str { self.inner.links.route_prefix() }
    pub fn links(&self) -> &LinkBuilder { &self.inner.links }
    pub fn format(&self) -> &Format { &self.inner.format }
    pub fn resource(&self) -> &R { &self.inner.resource }

    /// Registers the six conventional routes on `router`.
    ///
    /// `destroy` has a link but no route; mount one by hand with
    /// [`Endpoint::serve`] if the resource supports it.
    pub fn register(self, router: Router) -> Router {
        let links = &self.inner.links;
        let routes = [
            (links.list(), Action::List),
            (links.new_link(), Action::New),
            (links.edit(":id"), Action::Edit),
            (links.create(), Action::Create),
            (links.show(":id"), Action::Show),
            (links.update(":id"), Action::Update),
        ];
        debug!(resource = %self.inner.name, prefix = %links.route_prefix(), "registering routes");

        routes.into_iter().fold(router, |router, (link, action)| {
            let endpoint = self.clone();
            router.on(link.method, &link.url, move |req: Request| {
                let endpoint = endpoint.clone();
                async move { endpoint.serve(action, req).await }
            })
        })
    }

    /// Runs `action` for `req` and produces its response.
    ///
    /// `create` and `update` answer with a redirect to the entity; `destroy`
    /// redirects to the list. Everything else is negotiated and rendered.
    pub async fn serve(&self, action: Action, mut req: Request) -> Result<Response, Error> {
        req.set_resource_route(action);
        debug!(resource = %self.inner.name, action = action.as_str(), "serving");

        let resource = &self.inner.resource;
        let links = &self.inner.links;

        let entity = match action {
            Action::List => {
                let limit = count_param(&req, "limit")?;
                let offset = count_param(&req, "offset")?;
                resource.list(limit, offset).await?
            }
            Action::New => resource.new_entity(req.properties()?).await?,
            Action::Edit => resource.edit(id_param(&req)?).await?,
            Action::Show => resource.show(id_param(&req)?).await?,
            Action::Create => {
                let id = resource.create(req.properties()?).await?;
                return Ok(Response::redirect(&links.show(id).url));
            }
            Action::Update => {
                let id = id_param(&req)?.to_owned();
                resource.update(&id, req.properties()?).await?;
                return Ok(Response::redirect(&links.update(id).url));
            }
            Action::Destroy => {
                resource.destroy(id_param(&req)?).await?;
                return Ok(Response::redirect(&links.list().url));
            }
        };

        self.respond(&req, entity).await
    }

    /// Negotiates a media type for `req` and renders `entity` with links.
    pub async fn respond(&self, req: &Request, entity: Value) -> Result<Response, Error> {
        let accepts = self.inner.format.accepts();
        let accept = req.header("accept");
        let media_type = self.inner.negotiator
            .preferred_media_type(accept, &accepts)
            .ok_or_else(|| Error::unsupported_media_type(accept.unwrap_or_default()))?;

        self.inner.format.dispatch(&media_type, req, self.with_links(entity)?).await
    }

    /// Adds the computed `links` to `entity`.
    ///
    /// Objects get `new`, `create` and `list`, plus `update`, `destroy` and
    /// `show` when they carry a truthy `id`. Links the entity already names
    /// are kept. Arrays become an object keyed by index, each element linked
    /// on its own; `null` becomes an empty object and other scalars are
    /// wrapped under `value`.
    pub fn with_links(&self, entity: Value) -> Result<Value, Error> {
        let map = match entity {
            Value::Object(map) => map,
            Value::Array(items) => items.into_iter()
                .enumerate()
                .map(|(i, item)| {
                    let item = match item {
                        Value::Object(map) => Value::Object(self.link_object(map)?),
                        other => other,
                    };
                    Ok((i.to_string(), item))
                })
                .collect::<Result<_, Error>>()?,
            Value::Null => Map::new(),
            other => Map::from_iter([("value".to_owned(), other)]),
        };
        Ok(Value::Object(self.link_object(map)?))
    }

    fn link_object(&self, mut map: Map<String, Value>) -> Result<Map<String, Value>, Error> {
        let links = &self.inner.links;
        let mut defaults: Vec<(Action, Link)> = vec![
            (Action::New, links.new_link()),
            (Action::Create, links.create()),
            (Action::List, links.list()),
        ];
        if let Some(id) = map.get("id").filter(|id| truthy(id)).map(id_string) {
            defaults.push((Action::Update, links.update(&id)));
            defaults.push((Action::Destroy, links.destroy(&id)));
            defaults.push((Action::Show, links.show(&id)));
        }

        let slot = map.entry("links").or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(existing) = slot {
            for (action, link) in defaults {
                if !existing.contains_key(action.as_str()) {
                    existing.insert(action.as_str().to_owned(), serde_json::to_value(&link)?);
                }
            }
        }
        Ok(map)
    }
}

fn id_param(req: &Request) -> Result<&str, Error> {
    req.param("id").ok_or_else(|| Error::bad_request("missing id"))
}

fn count_param(req: &Request, key: &str) -> Result<Option<u64>, Error> {
    req.query_param(key)
        .map(|v| v.parse().map_err(|_| Error::bad_request(format!("`{key}` must be a non-negative integer"))))
        .transpose()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── EndpointBuilder ───────────────────────────────────────────────────────────

/// Configures an [`Endpoint`]. Obtain via [`Endpoint::builder`].
pub struct EndpointBuilder<R> {
    name: String,
    resource: R,
    view_engine: Option<Arc<dyn ViewEngine>>,
    negotiator: Arc<dyn Negotiator>,
    inflector: Arc<dyn Inflector>,
    tables: Vec<RendererTable>,
}

impl<R: Resource> EndpointBuilder<R> {
    /// Enables `text/html` rendering through `engine`.
    pub fn view_engine(mut self, engine: impl ViewEngine) -> Self {
        self.view_engine = Some(Arc::new(engine));
        self
    }

    pub fn negotiator(mut self, negotiator: impl Negotiator) -> Self {
        self.negotiator = Arc::new(negotiator);
        self
    }

    pub fn inflector(mut self, inflector: impl Inflector) -> Self {
        self.inflector = Arc::new(inflector);
        self
    }

    /// Adds renderers on top of the base `text/html` and `application/json`
    /// ones. Later tables take precedence over earlier ones.
    pub fn format(mut self, table: RendererTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Fails with [`Error::Configuration`] when the name is empty.
    pub fn build(self) -> Result<Endpoint<R>, Error> {
        if self.name.is_empty() {
            return Err(Error::configuration(
                r#"a resource requires a name, e.g. Endpoint::new("widget", ..)"#,
            ));
        }

        let format = self.tables.into_iter()
            .fold(Format::new(self.name.clone(), self.view_engine), Format::specialize);

        Ok(Endpoint {
            inner: Arc::new(Inner {
                links: LinkBuilder::new(&self.name, self.inflector),
                resource: self.resource,
                name: self.name,
                format,
                negotiator: self.negotiator,
            }),
        })
    }
}
