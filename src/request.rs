//! Incoming HTTP request type.

use std::collections::HashMap;

use http_body_util::{BodyExt, Limited};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::method::Method;
use crate::resource::Action;

/// Errors raised while buffering a request body.
pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An incoming HTTP request.
///
/// The server builds one per hyper request with the body fully buffered; tests
/// and in-process callers build one with [`Request::builder`].
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) resource_route: Option<Action>,
}

impl Request {
    /// Starts an in-memory request. `target` may carry a query string.
    pub fn builder(method: Method, target: &str) -> RequestBuilder {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (target.to_owned(), None),
        };
        RequestBuilder {
            request: Self {
                method,
                path,
                query,
                headers: Vec::new(),
                body: Vec::new(),
                params: HashMap::new(),
                resource_route: None,
            },
        }
    }

    /// Buffers a hyper request into a [`Request`], reading at most
    /// `body_limit` bytes of body.
    ///
    /// Returns `Ok(None)` when the method is not one [`Method`] knows. A body
    /// over the limit fails with [`http_body_util::LengthLimitError`].
    pub(crate) async fn from_hyper<B>(req: hyper::Request<B>, body_limit: usize) -> Result<Option<Self>, BoxError>
    where
        B: hyper::body::Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let Ok(method) = Method::try_from(&parts.method) else {
            return Ok(None);
        };
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        let body = Limited::new(body, body_limit).collect().await?.to_bytes().to_vec();

        Ok(Some(Self {
            method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers,
            body,
            params: HashMap::new(),
            resource_route: None,
        }))
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the first query-string value for `key`, percent-decoded.
    pub fn query_param(&self, key: &str) -> Option<String> {
        form_urlencoded::parse(self.query.as_deref()?.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// The resource action that served this request, once a resource route
    /// has claimed it.
    pub fn resource_route(&self) -> Option<Action> {
        self.resource_route
    }

    pub(crate) fn set_resource_route(&mut self, action: Action) {
        self.resource_route = Some(action);
    }

    /// All request parameters merged into one object.
    ///
    /// Query string first, then the body (JSON object or URL-encoded form,
    /// chosen by `content-type`), then path parameters; later sources win.
    pub fn properties(&self) -> Result<Map<String, Value>, Error> {
        let mut props = Map::new();

        if let Some(query) = &self.query {
            extend_form(&mut props, query.as_bytes());
        }

        if !self.body.is_empty() {
            let content_type = self.header("content-type")
                .and_then(|v| v.parse::<mime::Mime>().ok());
            match content_type.as_ref().map(mime::Mime::essence_str) {
                Some("application/json") => {
                    match serde_json::from_slice::<Value>(&self.body) {
                        Ok(Value::Object(body)) => props.extend(body),
                        Ok(_) => return Err(Error::bad_request("JSON body must be an object")),
                        Err(e) => return Err(Error::bad_request(format!("invalid JSON body: {e}"))),
                    }
                }
                Some("application/x-www-form-urlencoded") => extend_form(&mut props, &self.body),
                _ => {}
            }
        }

        for (k, v) in &self.params {
            props.insert(k.clone(), Value::String(v.clone()));
        }

        Ok(props)
    }
}

fn extend_form(props: &mut Map<String, Value>, input: &[u8]) {
    for (k, v) in form_urlencoded::parse(input) {
        props.insert(k.into_owned(), Value::String(v.into_owned()));
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for in-memory [`Request`]s. Obtain via [`Request::builder`].
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request.body = body.into();
        self
    }

    pub fn finish(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_splits_the_query_string() {
        let req = Request::builder(Method::Get, "/widgets?limit=10&offset=20").finish();
        assert_eq!(req.path(), "/widgets");
        assert_eq!(req.query(), Some("limit=10&offset=20"));
        assert_eq!(req.query_param("offset").as_deref(), Some("20"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::builder(Method::Get, "/")
            .header("Accept", "application/json")
            .finish();
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn properties_merge_query_body_and_params() {
        let mut req = Request::builder(Method::Put, "/widget/3?color=red&size=s")
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"size":"xl","id":"ignored"}"#)
            .finish();
        req.params.insert("id".to_owned(), "3".to_owned());

        let props = req.properties().unwrap();
        assert_eq!(props["color"], "red");
        assert_eq!(props["size"], "xl");
        assert_eq!(props["id"], "3");
    }

    #[test]
    fn properties_read_url_encoded_forms() {
        let req = Request::builder(Method::Post, "/widget")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("name=big+wheel&color=%23f00")
            .finish();

        let props = req.properties().unwrap();
        assert_eq!(props["name"], "big wheel");
        assert_eq!(props["color"], "#f00");
    }

    #[test]
    fn malformed_json_body_is_a_bad_request() {
        let req = Request::builder(Method::Post, "/widget")
            .header("content-type", "application/json")
            .body("[1, 2")
            .finish();

        let err = req.properties().unwrap_err();
        assert_eq!(err.status(), http::StatusCode::BAD_REQUEST);
    }
}
