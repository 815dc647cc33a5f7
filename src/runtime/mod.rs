//! Controller runtime: configuration and the HTTP server.

mod config;
mod server;

pub use config::ControllerConfig;
pub use server::{BoundServer, ControllerServer, ServeError};
