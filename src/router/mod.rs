//! Route table mapping method and path patterns onto API endpoints.

mod route;

pub use route::{Endpoint, Operation, Route, RouteMethod, RouteTable};
