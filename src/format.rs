//! Media-type dispatch.
//!
//! A [`Format`] is a stack of [`RendererTable`]s. The bottom of the stack is
//! the base table every resource gets (`text/html`, then `application/json`);
//! a resource can [`specialize`](Format::specialize) it with tables of its
//! own, which sit above the base. Lookups walk the stack from the top, so a
//! media type declared by a specialization shadows the base renderer of the
//! same name both in [`accepts`](Format::accepts) order and in
//! [`dispatch`](Format::dispatch).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use serde_json::Value;

use crate::error::Error;
use crate::request::Request;
use crate::resource::Action;
use crate::response::Response;

pub const TEXT_HTML: &str = "text/html";
pub const APPLICATION_JSON: &str = "application/json";

/// Renders an entity as one media type.
///
/// Plain functions and closures with the signature
/// `Fn(&Format, &Request, Value) -> Result<Response, Error>` are renderers;
/// implement the trait directly when rendering needs to await.
#[async_trait]
pub trait Renderer: Send + Sync + 'static {
    async fn render(&self, format: &Format, req: &Request, entity: Value) -> Result<Response, Error>;
}

#[async_trait]
impl<F> Renderer for F
where
    F: Fn(&Format, &Request, Value) -> Result<Response, Error> + Send + Sync + 'static,
{
    async fn render(&self, format: &Format, req: &Request, entity: Value) -> Result<Response, Error> {
        self(format, req, entity)
    }
}

/// The view-rendering collaborator behind `text/html`.
#[async_trait]
pub trait ViewEngine: Send + Sync + 'static {
    /// Renders `template` with `locals` bound as the template's variables.
    async fn respond(&self, template: &str, locals: &Value) -> Result<Response, Error>;
}

// ── RendererTable ─────────────────────────────────────────────────────────────

/// Media types bound to renderers, in declaration order.
#[derive(Clone, Default)]
pub struct RendererTable {
    entries: Vec<(String, Arc<dyn Renderer>)>,
}

impl RendererTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `media_type` to `renderer`, replacing an earlier binding in place.
    ///
    /// The key is stored as its lower-cased essence: `text/csv; header=present`
    /// binds `text/csv`, the same form [`Format::dispatch`] looks up.
    pub fn with(mut self, media_type: &str, renderer: impl Renderer) -> Self {
        let media_type = essence(media_type);
        let renderer: Arc<dyn Renderer> = Arc::new(renderer);
        match self.entries.iter_mut().find(|(k, _)| *k == media_type) {
            Some(entry) => entry.1 = renderer,
            None => self.entries.push((media_type, renderer)),
        }
        self
    }

    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn get(&self, media_type: &str) -> Option<&Arc<dyn Renderer>> {
        self.entries.iter().find(|(k, _)| k == media_type).map(|(_, r)| r)
    }

    /// The table every [`Format`] starts from.
    pub fn base() -> Self {
        Self::new()
            .with(TEXT_HTML, Html)
            .with(APPLICATION_JSON, Json)
    }
}

impl fmt::Debug for RendererTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.media_types()).finish()
    }
}

// ── Format ────────────────────────────────────────────────────────────────────

/// The renderer stack of one resource.
#[derive(Clone)]
pub struct Format {
    name: String,
    view_engine: Option<Arc<dyn ViewEngine>>,
    layers: Vec<RendererTable>,
}

impl Format {
    pub fn new(name: impl Into<String>, view_engine: Option<Arc<dyn ViewEngine>>) -> Self {
        Self {
            name: name.into(),
            view_engine,
            layers: vec![RendererTable::base()],
        }
    }

    /// Pushes `table` on top of the stack.
    pub fn specialize(mut self, table: RendererTable) -> Self {
        self.layers.insert(0, table);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn view_engine(&self) -> Option<&Arc<dyn ViewEngine>> {
        self.view_engine.as_ref()
    }

    /// Every media type this format renders, most specific table first, each
    /// listed once at its first position.
    pub fn accepts(&self) -> Vec<&str> {
        self.layers.iter()
            .flat_map(RendererTable::media_types)
            .unique()
            .collect()
    }

    /// Renders `entity` as `media_type`.
    ///
    /// Parameters such as `charset` are ignored when matching.
    pub async fn dispatch(&self, media_type: &str, req: &Request, entity: Value) -> Result<Response, Error> {
        let essence = essence(media_type);
        let renderer = self.layers.iter()
            .find_map(|table| table.get(&essence))
            .ok_or_else(|| Error::unsupported_media_type(media_type))?;
        renderer.render(self, req, entity).await
    }

    /// The view template for a request served by `route`.
    ///
    /// `<name>/<route>.html`, except that a template name equal to the
    /// resource name falls back to `list`.
    pub fn template_for(&self, route: Option<Action>) -> String {
        let route = route.unwrap_or(Action::List);
        let mut template = format!("{}.html", route.as_str());
        if template == self.name {
            template = Action::List.as_str().to_owned();
        }
        format!("{}/{template}", self.name.trim_end_matches('/'))
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("name", &self.name)
            .field("view_engine", &self.view_engine.is_some())
            .field("accepts", &self.accepts())
            .finish()
    }
}

fn essence(media_type: &str) -> String {
    media_type.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

// ── Built-in renderers ────────────────────────────────────────────────────────

/// `text/html` through the configured [`ViewEngine`].
pub struct Html;

#[async_trait]
impl Renderer for Html {
    async fn render(&self, format: &Format, req: &Request, entity: Value) -> Result<Response, Error> {
        let engine = format.view_engine().ok_or_else(|| {
            Error::configuration("text/html support requires a view engine to be set")
        })?;
        let template = format.template_for(req.resource_route());
        engine.respond(&template, &entity).await
    }
}

/// `application/json` through `serde_json`.
pub struct Json;

#[async_trait]
impl Renderer for Json {
    async fn render(&self, _format: &Format, _req: &Request, entity: Value) -> Result<Response, Error> {
        Ok(Response::json(serde_json::to_vec(&entity)?))
    }
}
