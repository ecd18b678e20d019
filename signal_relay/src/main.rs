//! Entry point for the signaling relay server

use clap::Parser;
use signal_relay::{AppState, Config, serve};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(config.json_logs);

    tracing::info!("signal-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(room) = &config.default_room {
        tracing::info!(room = %room, "New connections join the default room");
    }

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    serve(listener, AppState::new(config)).await?;

    Ok(())
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signal_relay=info"));

    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(filter).init();
    }
}
