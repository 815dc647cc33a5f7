//! Log database access for the `/proxy/{dbType}` endpoint.

mod config;
mod proxy;

pub use config::{process_env, EnvLookup, LogDbConfig, INFLUXDB_URL};
pub use proxy::{LogDatabase, LogProxy};
