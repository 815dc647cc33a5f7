//! Transport-independent request and response types used by the router
//! and handlers.

mod request;
mod response;

pub use request::{ApiRequest, Method};
pub use response::{ApiResponse, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};
