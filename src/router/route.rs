//! Route table for the controller API.
//!
//! Patterns are literal segments and `{name}` placeholders. A placeholder
//! matches exactly one non-empty segment; there are no wildcards. Segments
//! are percent-decoded before they are compared or bound.

use crate::http::Method;
use crate::model::ResourceKind;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// HTTP method for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
    Any,
}

impl RouteMethod {
    /// Check if this method matches the given request method.
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            RouteMethod::Any => true,
            RouteMethod::Get => *method == Method::Get,
            RouteMethod::Post => *method == Method::Post,
            RouteMethod::Put => *method == Method::Put,
            RouteMethod::Delete => *method == Method::Delete,
        }
    }
}

/// The CRUD operations every resource store offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Get,
    Update,
    Delete,
}

/// What a matched route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Service identity at `/`.
    Home,
    Resource(ResourceKind, Operation),
    /// `/proxy/{dbType}`.
    LogProxy,
}

/// A route entry that maps a method and path pattern to an endpoint.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: RouteMethod,
    pub pattern: String,
    pub endpoint: Endpoint,
}

impl Route {
    pub fn new(method: RouteMethod, pattern: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            endpoint,
        }
    }

    /// Match the route against a request, returning the resolved
    /// placeholders on success.
    pub fn matches(&self, method: &Method, path: &str) -> Option<HashMap<String, String>> {
        if !self.method.matches(method) {
            return None;
        }

        let route_segments: Vec<&str> = self.pattern.split('/').collect();
        let path_segments: Vec<&str> = path.split('/').collect();

        if route_segments.len() != path_segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (r, p) in route_segments.iter().zip(path_segments.iter()) {
            let p = percent_decode_str(p).decode_utf8_lossy();
            match placeholder_name(r) {
                Some(name) => {
                    if p.is_empty() {
                        return None;
                    }
                    params.insert(name.to_string(), p.into_owned());
                }
                None if *r == p => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|s| !s.is_empty())
}

/// Ordered, immutable set of routes. The first match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The controller's route table: home, CRUD for every resource kind,
    /// and the log proxy.
    pub fn controller() -> Self {
        let mut routes = vec![Route::new(RouteMethod::Any, "/", Endpoint::Home)];

        for kind in ResourceKind::ALL {
            let collection = kind.collection_path();
            let item = format!("{}/{{{}}}", collection, kind.placeholder());
            let crud = [
                (RouteMethod::Get, collection.to_string(), Operation::List),
                (RouteMethod::Post, collection.to_string(), Operation::Create),
                (RouteMethod::Get, item.clone(), Operation::Get),
                (RouteMethod::Put, item.clone(), Operation::Update),
                (RouteMethod::Delete, item, Operation::Delete),
            ];
            for (method, pattern, op) in crud {
                routes.push(Route::new(method, pattern, Endpoint::Resource(kind, op)));
            }
        }

        routes.push(Route::new(
            RouteMethod::Post,
            "/proxy/{dbType}",
            Endpoint::LogProxy,
        ));

        Self::new(routes)
    }

    /// Find the route for a request.
    pub fn find(&self, method: &Method, path: &str) -> Option<(&Route, HashMap<String, String>)> {
        self.routes
            .iter()
            .find_map(|r| r.matches(method, path).map(|params| (r, params)))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
