//! Error types for the connection drivers.

use thiserror::Error;

/// Errors that end a single connection driver.
///
/// Every variant is fatal for the connection that produced it and for that
/// connection only. Drivers never retry.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The WebSocket handshake or the underlying TCP connect failed.
    #[error("connect error: {0}")]
    Connect(#[source] std::io::Error),

    /// The connection was not established within the configured timeout.
    #[error("connect timed out")]
    Timeout,

    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The server closed the connection.
    #[error("transport connection closed")]
    TransportClosed,

    /// An inbound payload was not valid JSON, or an outbound command could not
    /// be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized [`Result`] type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn serialization_error_converts_with_question_mark() {
        fn decode(text: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(text)?)
        }
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, DriverError::Serialization(_)));
        assert!(err.to_string().starts_with("serialization error:"));
    }

    #[test]
    fn connect_error_keeps_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DriverError::Connect(io);
        assert_eq!(err.to_string(), "connect error: refused");
        let source = std::error::Error::source(&err).expect("io source");
        assert_eq!(source.to_string(), "refused");
    }
}
