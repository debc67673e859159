//! Colour Balls session server (default binary).
//!
//! Serves game sessions over the line-delimited JSON protocol of
//! [`colour_balls::adapter`]. Configuration comes from `COLOUR_BALLS_*`
//! environment variables; log verbosity from `RUST_LOG` (default `info`).

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use colour_balls::adapter::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        seed = config.seed,
        max_sessions = config.max_sessions,
        "starting colour-balls"
    );

    tokio::select! {
        res = run_server(config, None) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
