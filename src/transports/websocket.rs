//! WebSocket transport built on `tokio-tungstenite`.
//!
//! `ws://` and `wss://` URLs both work; TLS goes through
//! [`MaybeTlsStream`](tokio_tungstenite::MaybeTlsStream).

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::error::DriverError;
use crate::transport::Transport;

/// The underlying client stream type.
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A [`Transport`] over one WebSocket client connection.
///
/// Only text frames are surfaced. Pings are answered by tungstenite, pongs
/// are ignored, binary frames are skipped and a close frame ends the stream.
#[derive(Debug)]
pub struct WebSocketTransport {
    stream: WsStream,
    closed: bool,
}

impl WebSocketTransport {
    /// Open a WebSocket connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Connect`] if the URL is invalid, the TCP connect
    /// fails or the upgrade is rejected. I/O error kinds are preserved.
    pub async fn connect(url: &str) -> Result<Self, DriverError> {
        tracing::debug!(url = %url, "opening WebSocket");

        let (stream, response) = tokio_tungstenite::connect_async(url).await.map_err(|e| {
            let kind = match &e {
                tokio_tungstenite::tungstenite::Error::Io(io) => io.kind(),
                _ => std::io::ErrorKind::Other,
            };
            DriverError::Connect(std::io::Error::new(kind, e))
        })?;

        tracing::debug!(url = %url, status = %response.status(), "WebSocket upgrade accepted");

        Ok(Self::from_stream(stream))
    }

    /// Like [`connect`](Self::connect), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] if the deadline elapses, or any error
    /// [`connect`](Self::connect) returns.
    pub async fn connect_with_timeout(url: &str, timeout: Duration) -> Result<Self, DriverError> {
        tokio::time::timeout(timeout, Self::connect(url))
            .await
            .map_err(|_| DriverError::Timeout)?
    }

    /// Wrap a stream that was connected elsewhere.
    pub fn from_stream(stream: WsStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, message: String) -> Result<(), DriverError> {
        if self.closed {
            return Err(DriverError::TransportClosed);
        }
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| DriverError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, DriverError>> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(msg) => msg,
                Err(e) => return Some(Err(DriverError::TransportReceive(e.to_string()))),
            };

            match msg {
                Message::Text(text) => return Some(Ok(text.to_string())),
                Message::Close(frame) => {
                    tracing::debug!(?frame, "server sent close frame");
                    return None;
                }
                Message::Binary(data) => {
                    tracing::warn!(len = data.len(), "skipping binary frame");
                }
                // Pong replies are queued by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream
            .close(None)
            .await
            .map_err(|e| DriverError::TransportSend(e.to_string()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    type ServerStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Accept a single WebSocket connection, hand it to `handler`, and return
    /// the URL to dial.
    async fn serve_once<F, Fut>(handler: F) -> String
    where
        F: FnOnce(ServerStream) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            handler(ws).await;
        });

        format!("ws://{addr}/ws")
    }

    #[test]
    fn websocket_transport_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<WebSocketTransport>();
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let err = WebSocketTransport::connect("not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Connect(_)));
    }

    #[tokio::test]
    async fn connect_refused_keeps_io_kind() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = WebSocketTransport::connect(&format!("ws://{addr}/ws"))
            .await
            .unwrap_err();
        match err {
            DriverError::Connect(io) => {
                assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
            }
            other => panic!("expected Connect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_with_timeout_elapses() {
        // Never accepted, so the upgrade response never arrives.
        let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", silent.local_addr().unwrap());

        let err = WebSocketTransport::connect_with_timeout(&url, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout));
    }

    #[tokio::test]
    async fn recv_yields_text_then_none_on_close() {
        let url = serve_once(|mut ws| async move {
            ws.send(Message::Text(r#"{"value":1}"#.into())).await.unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        assert_eq!(transport.recv().await.unwrap().unwrap(), r#"{"value":1}"#);
        assert!(transport.recv().await.is_none());
    }

    #[tokio::test]
    async fn recv_skips_binary_and_ping_frames() {
        let url = serve_once(|mut ws| async move {
            ws.send(Message::Binary(vec![1, 2, 3].into())).await.unwrap();
            ws.send(Message::Ping(Vec::new().into())).await.unwrap();
            ws.send(Message::Text("after".into())).await.unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        assert_eq!(transport.recv().await.unwrap().unwrap(), "after");
    }

    #[tokio::test]
    async fn send_reaches_server() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let url = serve_once(|mut ws| async move {
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                tx.send(text.to_string()).unwrap();
            }
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport
            .send(r#"{"type":"move","direction":"down"}"#.to_string())
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), r#"{"type":"move","direction":"down"}"#);
    }

    #[tokio::test]
    async fn send_after_close_is_rejected_and_close_is_idempotent() {
        let url = serve_once(|mut ws| async move { while let Some(Ok(_)) = ws.next().await {} })
            .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close().await.unwrap();
        transport.close().await.unwrap();

        let err = transport.send("late".to_string()).await.unwrap_err();
        assert!(matches!(err, DriverError::TransportClosed));
    }
}
