//! An in-memory widget resource.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example widgets
//!
//! Try:
//!   curl -H 'accept: application/json' http://localhost:3000/widgets
//!   curl -i -X POST http://localhost:3000/widget \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"sprocket"}'
//!   curl -H 'accept: application/json' http://localhost:3000/widget/1
//!   curl -H 'accept: text/html' http://localhost:3000/widget/1

use std::sync::RwLock;

use async_trait::async_trait;
use resourceful::{Config, Endpoint, Error, Resource, Response, Router, Server, ViewEngine};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Widgets {
    rows: RwLock<Vec<Value>>,
}

impl Widgets {
    fn index(id: &str) -> Result<usize, Error> {
        id.parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .ok_or_else(|| Error::not_found(format!("no widget {id}")))
    }
}

#[async_trait]
impl Resource for Widgets {
    async fn list(&self, limit: Option<u64>, offset: Option<u64>) -> Result<Value, Error> {
        let rows = self.rows.read().map_err(|_| Error::configuration("widget store poisoned"))?;
        let offset = offset.map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(Value::Array(rows.iter().skip(offset).take(limit).cloned().collect()))
    }

    async fn show(&self, id: &str) -> Result<Value, Error> {
        let rows = self.rows.read().map_err(|_| Error::configuration("widget store poisoned"))?;
        rows.get(Self::index(id)?)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no widget {id}")))
    }

    async fn edit(&self, id: &str) -> Result<Value, Error> {
        self.show(id).await
    }

    async fn new_entity(&self, properties: Map<String, Value>) -> Result<Value, Error> {
        Ok(json!({ "name": properties.get("name").cloned().unwrap_or_default() }))
    }

    async fn create(&self, mut properties: Map<String, Value>) -> Result<String, Error> {
        let mut rows = self.rows.write().map_err(|_| Error::configuration("widget store poisoned"))?;
        let id = rows.len() + 1;
        properties.insert("id".to_owned(), json!(id));
        rows.push(Value::Object(properties));
        Ok(id.to_string())
    }

    async fn update(&self, id: &str, properties: Map<String, Value>) -> Result<(), Error> {
        let mut rows = self.rows.write().map_err(|_| Error::configuration("widget store poisoned"))?;
        let row = rows.get_mut(Self::index(id)?)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::not_found(format!("no widget {id}")))?;
        row.extend(properties.into_iter().filter(|(k, _)| k != "id"));
        Ok(())
    }
}

/// Dumps the locals into a `<pre>` block under the template's name.
struct Pre;

#[async_trait]
impl ViewEngine for Pre {
    async fn respond(&self, template: &str, locals: &Value) -> Result<Response, Error> {
        let pretty = serde_json::to_string_pretty(locals)?;
        Ok(Response::html(format!("<h1>{template}</h1>\n<pre>{pretty}</pre>\n")))
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let widgets = Endpoint::builder("widget", Widgets::default())
        .view_engine(Pre)
        .build()?;

    let app = Router::new().resource(widgets);

    Server::from_config(&Config::from_env()?).serve(app).await
}
