//! HTTP routing and the serve loop

use crate::config::Config;
use crate::handler::RelayHandler;
use crate::state::RoomRegistry;
use crate::ws;
use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;

const INFO: &str = "Signal Relay (WebSocket)\n\
    \n\
    Endpoints:\n\
    - GET /health - Health check\n\
    - GET /ws - WebSocket signaling endpoint\n\
    \n\
    Protocol (JSON text frames):\n\
    1. {\"join\": \"<room>\"} to join a room\n\
    2. Any other object is relayed verbatim to the other members of your room\n\
    3. Add \"roomId\": \"<room>\" to relay to a specific room instead\n\
    4. {\"leave\": true} to leave your room\n";

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RelayHandler>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mut handler = RelayHandler::new(Arc::new(RoomRegistry::new()));
        if let Some(room) = &config.default_room {
            handler = handler.with_default_room(room.as_str());
        }

        Self {
            handler: Arc::new(handler),
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        self.handler.registry()
    }
}

/// Build the router for the relay
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
        .route("/ws", get(ws_upgrade))
        .fallback(not_found)
        .with_state(state)
}

/// Serve on `listener` until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| ws::run_connection(socket, state.handler, state.config))
}

async fn health() -> &'static str {
    "OK"
}

async fn info() -> &'static str {
    INFO
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutting down");
}
