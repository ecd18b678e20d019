//! Command-line and environment configuration

use clap::Parser;
use std::time::Duration;

/// Room-based WebRTC signaling relay
#[derive(Parser, Clone, Debug)]
#[command(name = "signal-relay", version, about = "Room-based WebRTC signaling relay")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "SIGNAL_RELAY_PORT", default_value = "3536")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "SIGNAL_RELAY_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Enable structured JSON logging
    #[arg(long, env = "SIGNAL_RELAY_JSON_LOGS")]
    pub json_logs: bool,

    /// Room every new connection joins before sending anything
    #[arg(long, env = "SIGNAL_RELAY_DEFAULT_ROOM")]
    pub default_room: Option<String>,

    /// Messages buffered per connection before sends to it fail
    #[arg(long, env = "SIGNAL_RELAY_OUTBOUND_QUEUE", default_value = "256")]
    pub outbound_queue: usize,

    /// Largest accepted inbound frame, in bytes
    #[arg(long, env = "SIGNAL_RELAY_MAX_MESSAGE_SIZE", default_value = "65536")]
    pub max_message_size: usize,

    /// Seconds between server heartbeat pings
    #[arg(long, env = "SIGNAL_RELAY_HEARTBEAT_INTERVAL_SECS", default_value = "5")]
    pub heartbeat_interval_secs: u64,

    /// Seconds without client traffic before the connection is dropped
    #[arg(long, env = "SIGNAL_RELAY_CLIENT_TIMEOUT_SECS", default_value = "10")]
    pub client_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3536,
            bind_address: "0.0.0.0".to_string(),
            json_logs: false,
            default_room: None,
            outbound_queue: 256,
            max_message_size: 64 * 1024,
            heartbeat_interval_secs: 5,
            client_timeout_secs: 10,
        }
    }
}

impl Config {
    /// `host:port` to bind the listener to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs.max(1))
    }
}
