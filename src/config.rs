//! Driver configuration.

use std::time::Duration;

/// Game server endpoint dialed by every driver.
pub const DEFAULT_URL: &str = "ws://localhost:8080/ws";

/// Number of concurrent connections.
pub const DEFAULT_CONNECTIONS: usize = 2;

/// Pause after each move before waiting for the next server message.
pub const DEFAULT_MOVE_INTERVAL: Duration = Duration::from_secs(2);

/// Settings shared by all drivers in one run.
///
/// # Example
///
/// ```
/// use pong_bot_client::config::DriverConfig;
/// use std::time::Duration;
///
/// let config = DriverConfig::default()
///     .with_connections(4)
///     .with_move_interval(Duration::from_millis(500));
/// assert_eq!(config.url, "ws://localhost:8080/ws");
/// assert_eq!(config.connections, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// WebSocket URL of the game server.
    pub url: String,
    /// How many drivers to launch. Zero is allowed and launches nothing.
    pub connections: usize,
    /// Delay between sending a move and reading the next message.
    pub move_interval: Duration,
    /// Optional deadline for establishing each connection.
    ///
    /// `None` (the default) waits as long as the OS allows.
    pub connect_timeout: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            connections: DEFAULT_CONNECTIONS,
            move_interval: DEFAULT_MOVE_INTERVAL,
            connect_timeout: None,
        }
    }
}

impl DriverConfig {
    /// Default configuration pointed at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the number of connections.
    #[must_use]
    pub fn with_connections(mut self, connections: usize) -> Self {
        self.connections = connections;
        self
    }

    /// Set the pause after each move.
    #[must_use]
    pub fn with_move_interval(mut self, interval: Duration) -> Self {
        self.move_interval = interval;
        self
    }

    /// Set a connect deadline.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}
