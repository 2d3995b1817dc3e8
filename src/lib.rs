//! # Pong Bot Client
//!
//! Load-test client for the Pong WebSocket server.
//!
//! The crate opens a fixed number of WebSocket connections, logs every JSON
//! message the server pushes and answers each one with a paddle move
//! (`{"type":"move","direction":"up"|"down"}`) after a fixed pause. Each
//! connection is driven by an independent task and stops on its first error.
//!
//! ## Features
//!
//! - **Transport-agnostic drivers**: implement [`Transport`] for any backend
//! - **WebSocket built-in**: the default `transport-websocket` feature provides
//!   `WebSocketTransport` and the [`driver::run`] fan-out
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn example() {
//! use pong_bot_client::{driver, DriverConfig};
//!
//! let config = DriverConfig::new("ws://localhost:8080/ws").with_connections(2);
//! let outcomes = driver::run(&config).await;
//! assert_eq!(outcomes.len(), 2);
//! # }
//! ```

pub mod config;
#[cfg(feature = "tokio-runtime")]
pub mod driver;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod transports;

pub use config::DriverConfig;
#[cfg(feature = "tokio-runtime")]
pub use driver::DriverOutcome;
pub use error::DriverError;
pub use protocol::{Direction, MoveCommand};
pub use transport::Transport;
#[cfg(feature = "transport-websocket")]
pub use transports::WebSocketTransport;
