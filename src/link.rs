//! Hypermedia links for resource actions.
//!
//! Every route a resource registers, and every link it hands out, comes from
//! the same [`LinkBuilder`], so the URLs a client follows are exactly the ones
//! the router answers.
//!
//! | Action    | URL                    | Method   |
//! |-----------|------------------------|----------|
//! | `list`    | plural of the prefix   | `GET`    |
//! | `new`     | `<prefix>/new`         | `GET`    |
//! | `edit`    | `<prefix>/edit/<id>`   | `GET`    |
//! | `create`  | `<prefix>`             | `POST`   |
//! | `show`    | `<prefix>/<id>`        | `GET`    |
//! | `update`  | `<prefix>/<id>`        | `PUT`    |
//! | `destroy` | `<prefix>/<id>`        | `DELETE` |

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::inflect::Inflector;
use crate::method::Method;

/// A `{url, method}` descriptor advertising a follow-up action.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Link {
    pub url: String,
    pub method: Method,
}

impl Link {
    /// Joins `prefix` and `suffix` into a link.
    ///
    /// An empty suffix or a lone `/` leaves `prefix` untouched; any other
    /// suffix is joined with exactly the `/` it may be missing.
    pub fn compose(prefix: &str, suffix: &str, method: Method) -> Self {
        let url = match suffix {
            "" | "/" => prefix.to_owned(),
            s if s.starts_with('/') => format!("{prefix}{s}"),
            s => format!("{prefix}/{s}"),
        };
        Self { url, method }
    }
}

/// The route prefix for a resource name: the name itself when it already
/// leads with `/`, otherwise the name with one prepended.
pub fn route_prefix(name: &str) -> String {
    if name.starts_with('/') {
        name.to_owned()
    } else {
        format!("/{name}")
    }
}

/// Computes the canonical links of one resource.
#[derive(Clone)]
pub struct LinkBuilder {
    route_prefix: String,
    inflector: Arc<dyn Inflector>,
}

impl LinkBuilder {
    pub fn new(name: &str, inflector: Arc<dyn Inflector>) -> Self {
        Self { route_prefix: route_prefix(name), inflector }
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    pub fn list(&self) -> Link {
        Link::compose(&self.inflector.pluralize(&self.route_prefix), "/", Method::Get)
    }

    pub fn show(&self, id: impl fmt::Display) -> Link {
        Link::compose(&self.route_prefix, &format!("/{id}"), Method::Get)
    }

    pub fn create(&self) -> Link {
        Link::compose(&self.route_prefix, "/", Method::Post)
    }

    pub fn update(&self, id: impl fmt::Display) -> Link {
        Link::compose(&self.route_prefix, &format!("/{id}"), Method::Put)
    }

    pub fn destroy(&self, id: impl fmt::Display) -> Link {
        Link::compose(&self.route_prefix, &format!("/{id}"), Method::Delete)
    }

    pub fn new_link(&self) -> Link {
        Link::compose(&self.route_prefix, "/new", Method::Get)
    }

    pub fn edit(&self, id: impl fmt::Display) -> Link {
        Link::compose(&self.route_prefix, &format!("/edit/{id}"), Method::Get)
    }
}

impl fmt::Debug for LinkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkBuilder")
            .field("route_prefix", &self.route_prefix)
            .finish_non_exhaustive()
    }
}
