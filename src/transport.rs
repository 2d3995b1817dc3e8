//! Transport abstraction for the connection drivers.
//!
//! The [`Transport`] trait is a bidirectional text message channel between a
//! driver and the game server. Message framing is the implementation's job.
//!
//! Connection setup is not part of the trait. Construct a connected transport
//! (for example with `WebSocketTransport::connect`) and hand it to
//! [`drive`](crate::driver::drive).
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use pong_bot_client::error::DriverError;
//! use pong_bot_client::transport::Transport;
//!
//! struct LoopbackTransport { queue: Vec<String> }
//!
//! #[async_trait]
//! impl Transport for LoopbackTransport {
//!     async fn send(&mut self, message: String) -> Result<(), DriverError> {
//!         self.queue.push(message);
//!         Ok(())
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, DriverError>> {
//!         self.queue.pop().map(Ok)
//!     }
//!
//!     async fn close(&mut self) -> Result<(), DriverError> {
//!         self.queue.clear();
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::DriverError;

/// A bidirectional text message transport owned by exactly one driver.
///
/// Each call to [`send`](Transport::send) transmits one complete JSON message
/// and each call to [`recv`](Transport::recv) returns one.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text message to the server.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::TransportSend`] if the message could not be sent,
    /// or [`DriverError::TransportClosed`] if the transport was already closed.
    async fn send(&mut self, message: String) -> Result<(), DriverError>;

    /// Receive the next JSON text message from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))`: a complete message was received
    /// - `Some(Err(e))`: a transport error occurred
    /// - `None`: the server closed the connection
    async fn recv(&mut self) -> Option<Result<String, DriverError>>;

    /// Close the connection. Calling it twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails. Implementations should
    /// still release resources in that case.
    async fn close(&mut self) -> Result<(), DriverError>;
}
