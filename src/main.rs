//! Fission controller binary.

use clap::Parser;
use fission_controller::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fission-controller", version, about = "Fission controller API server")]
struct Cli {
    /// Port to serve the API on.
    #[arg(long, env = "FISSION_CONTROLLER_PORT", default_value_t = 8888)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ControllerConfig::new().port(cli.port);
    let store = ResourceStore::in_memory(config.storage_root.clone());
    let api = Api::new(&store);

    if let Err(err) = ControllerServer::new(config, api).serve().await {
        tracing::error!(error = %err, "Server failed to start");
        std::process::exit(1);
    }
}
