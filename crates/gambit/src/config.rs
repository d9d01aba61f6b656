//! Server and match configuration.

use std::path::Path;
use std::time::Duration;

use gambit_board::BoardConfig;
use serde::{Deserialize, Serialize};

use crate::GambitError;

/// Settings for the match server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Capacity of the channel feeding the match actor. Connection tasks
    /// wait when it's full.
    pub event_channel_size: usize,

    /// Frames queued per connection before a slow peer is dropped.
    pub outbound_queue_size: usize,

    /// Seconds a new connection gets to finish the WebSocket handshake.
    pub handshake_timeout_secs: u64,

    /// Seconds between KeepAlive broadcasts. `0` turns them off.
    pub keep_alive_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7777".to_string(),
            event_channel_size: 64,
            outbound_queue_size: 256,
            handshake_timeout_secs: 10,
            keep_alive_interval_secs: 20,
        }
    }
}

impl ServerConfig {
    /// The keep-alive period, or `None` when disabled.
    pub fn keep_alive_interval(&self) -> Option<Duration> {
        (self.keep_alive_interval_secs > 0)
            .then(|| Duration::from_secs(self.keep_alive_interval_secs))
    }
}

/// Everything a Gambit deployment reads at startup.
///
/// Missing sections and fields fall back to their defaults, so
/// `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GambitConfig {
    pub server: ServerConfig,
    pub board: BoardConfig,
}

impl GambitConfig {
    /// Loads a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GambitError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GambitError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&text)?;
        config.board = config.board.validated();
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}
