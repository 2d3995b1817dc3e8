#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Shared helpers for the integration tests.
//!
//! - [`spawn_server`]: a local WebSocket server with a per-connection script
//! - [`LogCapture`]: collects formatted `tracing` output for assertions

use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Server side of one accepted connection.
pub type ServerStream = WebSocketStream<TcpStream>;

/// The `{"value": 1}` payload pushed by the scripted server.
pub const VALUE_ONE: &str = r#"{"value": 1}"#;

// ── Mock server ─────────────────────────────────────────────────────

/// Start a WebSocket server on an ephemeral port.
///
/// `handler` runs once per accepted connection with the accept order (0, 1,
/// ...), the stream, and a sender for recording what the client sent.
/// Returns the URL to dial and the receiving end of the recording channel.
pub async fn spawn_server<F, Fut>(handler: F) -> (String, mpsc::UnboundedReceiver<String>)
where
    F: Fn(usize, ServerStream, mpsc::UnboundedSender<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        let mut accepted = 0;
        while let Ok((tcp, _)) = listener.accept().await {
            let conn = accepted;
            accepted += 1;
            let handler = Arc::clone(&handler);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Ok(ws) = tokio_tungstenite::accept_async(tcp).await {
                    handler(conn, ws, tx).await;
                }
            });
        }
    });

    (format!("ws://{addr}/ws"), rx)
}

/// Push [`VALUE_ONE`], record the single reply, then close.
pub async fn push_value_and_record_reply(mut ws: ServerStream, tx: mpsc::UnboundedSender<String>) {
    ws.send(Message::Text(VALUE_ONE.into())).await.unwrap();
    if let Some(Ok(Message::Text(reply))) = ws.next().await {
        let _ = tx.send(reply.to_string());
    }
    let _ = ws.close(None).await;
}

/// Close the connection straight after the upgrade.
pub async fn close_immediately(mut ws: ServerStream) {
    let _ = ws.close(None).await;
}

/// A URL on which nothing is listening.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}/ws")
}

// ── Log capture ─────────────────────────────────────────────────────

#[derive(Clone)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes `tracing` output on the current thread into a buffer until dropped.
///
/// `#[tokio::test]` uses a current-thread runtime, so spawned driver tasks
/// log through this subscriber too.
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl LogCapture {
    pub fn start() -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = CaptureWriter(Arc::clone(&buf));
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self { buf, _guard: guard }
    }

    /// Everything logged so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Logged lines containing every one of `needles`.
    pub fn lines_with(&self, needles: &[&str]) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| needles.iter().all(|needle| line.contains(needle)))
            .map(str::to_owned)
            .collect()
    }
}
