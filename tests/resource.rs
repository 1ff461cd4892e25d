use std::sync::Mutex;

use async_trait::async_trait;
use resourceful::{
    Endpoint, Error, Format, Method, Negotiator, RendererTable, Request, Resource, Response,
    Router, StatusCode, ViewEngine,
};
use serde_json::{json, Map, Value};

/// In-memory widgets: ids are positions in the vector, starting at 1.
#[derive(Default)]
struct Widgets {
    rows: Mutex<Vec<Map<String, Value>>>,
    last_page: Mutex<Option<(Option<u64>, Option<u64>)>>,
}

impl Widgets {
    fn with_rows(rows: &[Value]) -> Self {
        let rows = rows.iter()
            .filter_map(|row| row.as_object().cloned())
            .collect();
        Self { rows: Mutex::new(rows), ..Self::default() }
    }

    fn find(&self, id: &str) -> Result<Value, Error> {
        let rows = self.rows.lock().unwrap();
        id.parse::<usize>()
            .ok()
            .and_then(|i| rows.get(i.checked_sub(1)?))
            .map(|row| Value::Object(row.clone()))
            .ok_or_else(|| Error::not_found(format!("no widget {id}")))
    }
}

#[async_trait]
impl Resource for Widgets {
    async fn list(&self, limit: Option<u64>, offset: Option<u64>) -> Result<Value, Error> {
        *self.last_page.lock().unwrap() = Some((limit, offset));
        let rows = self.rows.lock().unwrap();
        Ok(Value::Array(rows.iter().cloned().map(Value::Object).collect()))
    }

    async fn show(&self, id: &str) -> Result<Value, Error> {
        self.find(id)
    }

    async fn edit(&self, id: &str) -> Result<Value, Error> {
        self.find(id)
    }

    async fn new_entity(&self, properties: Map<String, Value>) -> Result<Value, Error> {
        Ok(Value::Object(properties))
    }

    async fn create(&self, mut properties: Map<String, Value>) -> Result<String, Error> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() + 41;
        properties.insert("id".to_owned(), json!(id + 1));
        rows.resize(id, Map::new());
        rows.push(properties);
        Ok((id + 1).to_string())
    }

    async fn update(&self, id: &str, properties: Map<String, Value>) -> Result<(), Error> {
        let current = self.find(id)?;
        if properties.get("version").is_some_and(|v| Some(v) != current.get("version")) {
            return Err(Error::http(StatusCode::CONFLICT, format!("widget {id} has changed")));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = &mut rows[id.parse::<usize>().unwrap_or_default() - 1];
        row.extend(properties.into_iter().filter(|(k, _)| k != "id"));
        Ok(())
    }
}

/// Renders `<template>|<locals>` so tests can see what the view received.
struct Templates;

#[async_trait]
impl ViewEngine for Templates {
    async fn respond(&self, template: &str, locals: &Value) -> Result<Response, Error> {
        Ok(Response::html(format!("{template}|{locals}")))
    }
}

fn app(widgets: Widgets) -> Router {
    let endpoint = Endpoint::builder("widget", widgets)
        .view_engine(Templates)
        .build()
        .unwrap();
    Router::new().resource(endpoint)
}

fn get(target: &str, accept: &str) -> Request {
    Request::builder(Method::Get, target).header("accept", accept).finish()
}

fn json_body(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

#[tokio::test]
async fn list_renders_json_with_links() {
    let router = app(Widgets::with_rows(&[json!({ "id": 1 })]));

    let res = router.handle(get("/widgets", "application/json")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("application/json"));
    let body = json_body(&res);
    assert_eq!(body["0"]["id"], 1);
    assert_eq!(body["0"]["links"]["show"], json!({ "url": "/widget/1", "method": "get" }));
    assert_eq!(body["links"]["list"], json!({ "url": "/widgets", "method": "get" }));
    assert_eq!(body["links"]["create"], json!({ "url": "/widget", "method": "post" }));
    assert_eq!(body["links"]["new"], json!({ "url": "/widget/new", "method": "get" }));
}

#[tokio::test]
async fn list_passes_limit_and_offset() {
    let widgets = Endpoint::new("widget", Widgets::default()).unwrap();
    let router = Router::new().resource(widgets.clone());

    let res = router.handle(get("/widgets?limit=10&offset=20", "application/json")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(*widgets.resource().last_page.lock().unwrap(), Some((Some(10), Some(20))));

    let res = router.handle(get("/widgets?limit=ten", "application/json")).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_redirects_to_the_new_entity() {
    let router = app(Widgets::default());

    let req = Request::builder(Method::Post, "/widget")
        .header("content-type", "application/json")
        .body(r#"{"color":"blue"}"#)
        .finish();
    let res = router.handle(req).await;

    assert_eq!(res.status_code(), StatusCode::FOUND);
    assert_eq!(res.header("location"), Some("/widget/42"));

    let res = router.handle(get("/widget/42", "application/json")).await;
    assert_eq!(json_body(&res)["color"], "blue");
}

#[tokio::test]
async fn update_redirects_to_the_entity() {
    let router = app(Widgets::with_rows(&[json!({ "id": 1, "color": "red" })]));

    let req = Request::builder(Method::Put, "/widget/1")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("color=green")
        .finish();
    let res = router.handle(req).await;

    assert_eq!(res.status_code(), StatusCode::FOUND);
    assert_eq!(res.header("location"), Some("/widget/1"));

    let res = router.handle(get("/widget/1", "application/json")).await;
    assert_eq!(json_body(&res)["color"], "green");
}

#[tokio::test]
async fn unacceptable_media_types_are_refused() {
    let router = app(Widgets::with_rows(&[json!({ "id": 1 })]));

    let res = router.handle(get("/widget/1", "text/plain")).await;

    assert_eq!(res.status_code(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn show_links_the_entity() {
    let router = app(Widgets::with_rows(&vec![json!({ "id": 7 }); 7]));

    let res = router.handle(get("/widget/7", "application/json")).await;

    let links = &json_body(&res)["links"];
    assert_eq!(links["show"], json!({ "url": "/widget/7", "method": "get" }));
    assert_eq!(links["update"], json!({ "url": "/widget/7", "method": "put" }));
    assert_eq!(links["destroy"], json!({ "url": "/widget/7", "method": "delete" }));
}

#[tokio::test]
async fn html_goes_through_the_view_engine() {
    let router = app(Widgets::with_rows(&[json!({ "id": 1 })]));

    let res = router.handle(get("/widget/edit/1", "text/html")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = String::from_utf8(res.body().to_vec()).unwrap();
    let (template, locals) = body.split_once('|').unwrap();
    assert_eq!(template, "widget/edit.html");
    let locals: Value = serde_json::from_str(locals).unwrap();
    assert_eq!(locals["links"]["update"]["url"], "/widget/1");

    let res = router.handle(get("/widget/new?color=red", "text/html")).await;
    let body = String::from_utf8(res.body().to_vec()).unwrap();
    assert!(body.starts_with("widget/new.html|"), "{body}");
    assert!(body.contains(r#""color":"red""#), "{body}");
}

#[tokio::test]
async fn html_without_a_view_engine_is_a_server_fault() {
    let endpoint = Endpoint::new("widget", Widgets::with_rows(&[json!({ "id": 1 })])).unwrap();
    let router = Router::new().resource(endpoint);

    let res = router.handle(get("/widget/1", "text/html")).await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn http_errors_reach_the_client() {
    let router = app(Widgets::default());

    let res = router.handle(get("/widget/99", "application/json")).await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.body(), b"no widget 99");
}

#[tokio::test]
async fn http_errors_keep_their_status() {
    let router = app(Widgets::with_rows(&[json!({ "id": 1, "version": 3 })]));

    let req = Request::builder(Method::Put, "/widget/1")
        .header("content-type", "application/json")
        .body(r#"{"version":2}"#)
        .finish();
    let res = router.handle(req).await;

    assert_eq!(res.status_code(), StatusCode::CONFLICT);
    assert_eq!(res.body(), b"widget 1 has changed");
}

#[tokio::test]
async fn unimplemented_actions_are_server_faults() {
    struct ReadOnly;

    #[async_trait]
    impl Resource for ReadOnly {
        async fn show(&self, id: &str) -> Result<Value, Error> {
            Ok(json!({ "id": id }))
        }
    }

    let router = Router::new().resource(Endpoint::new("widget", ReadOnly).unwrap());

    let res = router.handle(Request::builder(Method::Post, "/widget").finish()).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let res = router.handle(get("/widget/3", "application/json")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn destroy_is_not_routed() {
    let router = app(Widgets::with_rows(&[json!({ "id": 1 })]));

    let res = router.handle(Request::builder(Method::Delete, "/widget/1").finish()).await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn specialized_formats_are_negotiated() {
    fn csv(_: &Format, _: &resourceful::Request, entity: Value) -> Result<Response, Error> {
        Ok(Response::builder().bytes("text/csv", format!("id\n{}", entity["id"]).into_bytes()))
    }

    let endpoint = Endpoint::builder("widget", Widgets::with_rows(&[json!({ "id": 1 })]))
        .format(RendererTable::new().with("text/csv", csv))
        .build()
        .unwrap();
    assert_eq!(endpoint.format().accepts(), ["text/csv", "text/html", "application/json"]);
    let router = Router::new().resource(endpoint);

    let res = router.handle(get("/widget/1", "text/csv")).await;
    assert_eq!(res.header("content-type"), Some("text/csv"));
    assert_eq!(res.body(), b"id\n1");

    // No Accept header: the most specific format comes first.
    let res = router.handle(Request::builder(Method::Get, "/widget/1").finish()).await;
    assert_eq!(res.header("content-type"), Some("text/csv"));
}

#[tokio::test]
async fn custom_collaborators() {
    struct AlwaysJson;

    impl Negotiator for AlwaysJson {
        fn preferred_media_type(&self, _accept: Option<&str>, _candidates: &[&str]) -> Option<String> {
            Some("application/json".to_owned())
        }
    }

    let endpoint = Endpoint::builder("/api/person", Widgets::default())
        .negotiator(AlwaysJson)
        .build()
        .unwrap();
    assert_eq!(endpoint.route_prefix(), "/api/person");
    assert_eq!(endpoint.links().list().url, "/api/people");
    let router = Router::new().resource(endpoint);

    let res = router.handle(get("/api/people", "text/plain")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(json_body(&res)["links"]["create"]["url"], "/api/person");

    let endpoint = Endpoint::builder("goose", Widgets::default())
        .inflector(|word: &str| format!("{word}-flock"))
        .build()
        .unwrap();
    assert_eq!(endpoint.links().list().url, "/goose-flock");
}
