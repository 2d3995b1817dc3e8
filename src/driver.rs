//! Connection drivers.
//!
//! A driver owns one connection and loops: read one server message, log it,
//! answer with a [`MoveCommand`], sleep, repeat. The first error of any kind
//! ends the driver. Nothing is retried and drivers never talk to each other.
//!
//! [`run`] launches one driver per index on a [`JoinSet`] and collects a
//! [`DriverOutcome`] from each.
//!
//! ```rust,no_run
//! # async fn example() {
//! use pong_bot_client::config::DriverConfig;
//! use pong_bot_client::driver;
//!
//! let outcomes = driver::run(&DriverConfig::default()).await;
//! for outcome in outcomes {
//!     println!("driver {} stopped after {} moves: {}", outcome.index, outcome.moves_sent, outcome.error);
//! }
//! # }
//! ```

use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::{DriverError, Result};
use crate::protocol::{decode_inbound, Direction, MoveCommand};
use crate::transport::Transport;

#[cfg(feature = "transport-websocket")]
use std::sync::Arc;
#[cfg(feature = "transport-websocket")]
use tokio::task::JoinSet;
#[cfg(feature = "transport-websocket")]
use tracing::warn;

#[cfg(feature = "transport-websocket")]
use crate::config::DriverConfig;
#[cfg(feature = "transport-websocket")]
use crate::transports::WebSocketTransport;

/// Why and when a driver stopped.
#[derive(Debug)]
pub struct DriverOutcome {
    /// Index of the connection, `0..connections`.
    pub index: usize,
    /// Moves successfully sent before the driver stopped.
    pub moves_sent: u64,
    /// The error that ended the driver.
    pub error: DriverError,
}

/// Drive an already-connected transport until it fails.
///
/// Returns the number of moves sent and the error that ended the loop. A clean
/// close by the server is reported as [`DriverError::TransportClosed`].
pub async fn drive(
    index: usize,
    transport: &mut impl Transport,
    move_interval: Duration,
) -> (u64, DriverError) {
    let mut moves_sent = 0;
    loop {
        match respond_once(index, transport, move_interval).await {
            Ok(_) => moves_sent += 1,
            Err(e) => return (moves_sent, e),
        }
    }
}

/// One receive → decode → move → pause cycle.
async fn respond_once(
    index: usize,
    transport: &mut impl Transport,
    move_interval: Duration,
) -> Result<Direction> {
    let text = transport
        .recv()
        .await
        .ok_or(DriverError::TransportClosed)??;

    let payload = decode_inbound(&text)?;
    info!(index, %payload, "message from server");

    let command = MoveCommand::random();
    transport.send(command.to_json()?).await?;
    debug!(index, direction = %command.direction(), "move sent");

    tokio::time::sleep(move_interval).await;
    Ok(command.direction())
}

/// Run a driver on a connected transport, then close it.
///
/// The terminating error is logged with the connection index and returned in
/// the outcome.
pub async fn run_connected(
    index: usize,
    mut transport: impl Transport,
    move_interval: Duration,
) -> DriverOutcome {
    info!(index, "connected");

    let (moves_sent, error) = drive(index, &mut transport, move_interval).await;
    error!(index, moves_sent, %error, "connection failed");

    if let Err(e) = transport.close().await {
        debug!(index, error = %e, "close handshake failed");
    }
    info!(index, "closed");

    DriverOutcome {
        index,
        moves_sent,
        error,
    }
}

/// Connect driver `index` to `config.url` and run it to completion.
#[cfg(feature = "transport-websocket")]
pub async fn run_driver(index: usize, config: &DriverConfig) -> DriverOutcome {
    info!(index, url = %config.url, "connecting");

    let connected = match config.connect_timeout {
        Some(timeout) => WebSocketTransport::connect_with_timeout(&config.url, timeout).await,
        None => WebSocketTransport::connect(&config.url).await,
    };

    match connected {
        Ok(transport) => run_connected(index, transport, config.move_interval).await,
        Err(error) => {
            error!(index, %error, "connection failed");
            DriverOutcome {
                index,
                moves_sent: 0,
                error,
            }
        }
    }
}

/// Launch `config.connections` drivers concurrently and wait for all of them.
///
/// Outcomes are sorted by index. A driver task that panics is logged and left
/// out of the result.
#[cfg(feature = "transport-websocket")]
pub async fn run(config: &DriverConfig) -> Vec<DriverOutcome> {
    let shared = Arc::new(config.clone());
    let mut tasks = JoinSet::new();

    for index in 0..config.connections {
        let config = Arc::clone(&shared);
        tasks.spawn(async move { run_driver(index, &config).await });
    }

    let mut outcomes = Vec::with_capacity(config.connections);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => warn!(error = %e, "driver task did not finish"),
        }
    }

    outcomes.sort_by_key(|outcome| outcome.index);
    outcomes
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
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc as StdArc, Mutex as StdMutex};

    /// Replays scripted inbound items and records everything sent.
    struct ScriptedTransport {
        incoming: VecDeque<Option<std::result::Result<String, DriverError>>>,
        sent: StdArc<StdMutex<Vec<String>>>,
        closed: StdArc<AtomicBool>,
        fail_sends: bool,
    }

    impl ScriptedTransport {
        fn new(
            incoming: Vec<Option<std::result::Result<String, DriverError>>>,
        ) -> (Self, StdArc<StdMutex<Vec<String>>>, StdArc<AtomicBool>) {
            let sent = StdArc::new(StdMutex::new(Vec::new()));
            let closed = StdArc::new(AtomicBool::new(false));
            let transport = Self {
                incoming: VecDeque::from(incoming),
                sent: StdArc::clone(&sent),
                closed: StdArc::clone(&closed),
                fail_sends: false,
            };
            (transport, sent, closed)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&mut self, message: String) -> std::result::Result<(), DriverError> {
            if self.fail_sends {
                return Err(DriverError::TransportSend("broken pipe".into()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, DriverError>> {
            // Running out of script behaves like the server hanging up.
            self.incoming.pop_front().flatten()
        }

        async fn close(&mut self) -> std::result::Result<(), DriverError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    #[tokio::test]
    async fn answers_every_message_until_close() {
        let (mut transport, sent, _closed) = ScriptedTransport::new(vec![
            Some(Ok(r#"{"value":1}"#.into())),
            Some(Ok(r#"{"ball":{"x":10,"y":20}}"#.into())),
            None,
        ]);

        let (moves, error) = drive(0, &mut transport, Duration::ZERO).await;

        assert_eq!(moves, 2);
        assert!(matches!(error, DriverError::TransportClosed));
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        for json in sent.iter() {
            let command: MoveCommand = serde_json::from_str(json).unwrap();
            assert!(matches!(command, MoveCommand::Move { .. }));
        }
    }

    #[tokio::test]
    async fn invalid_json_stops_the_driver_without_replying() {
        let (mut transport, sent, _closed) = ScriptedTransport::new(vec![
            Some(Ok("not json".into())),
            Some(Ok(r#"{"value":1}"#.into())),
        ]);

        let (moves, error) = drive(1, &mut transport, Duration::ZERO).await;

        assert_eq!(moves, 0);
        assert!(matches!(error, DriverError::Serialization(_)));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn receive_error_is_returned_as_is() {
        let (mut transport, _sent, _closed) = ScriptedTransport::new(vec![
            Some(Ok(r#"{"value":1}"#.into())),
            Some(Err(DriverError::TransportReceive("reset by peer".into()))),
        ]);

        let (moves, error) = drive(0, &mut transport, Duration::ZERO).await;

        assert_eq!(moves, 1);
        match error {
            DriverError::TransportReceive(msg) => assert_eq!(msg, "reset by peer"),
            other => panic!("expected TransportReceive, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_failure_stops_the_driver() {
        let (mut transport, _sent, _closed) =
            ScriptedTransport::new(vec![Some(Ok(r#"{"value":1}"#.into()))]);
        transport.fail_sends = true;

        let (moves, error) = drive(0, &mut transport, Duration::ZERO).await;

        assert_eq!(moves, 0);
        assert!(matches!(error, DriverError::TransportSend(_)));
    }

    #[tokio::test]
    async fn run_connected_closes_the_transport() {
        let (transport, _sent, closed) = ScriptedTransport::new(vec![None]);

        let outcome = run_connected(3, transport, Duration::ZERO).await;

        assert_eq!(outcome.index, 3);
        assert_eq!(outcome.moves_sent, 0);
        assert!(matches!(outcome.error, DriverError::TransportClosed));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn pause_does_not_block_other_drivers() {
        // Both drivers share one current-thread runtime, so a blocking pause in
        // the slow driver would hold the fast one back for the full interval.
        let interval = Duration::from_millis(500);
        let (mut slow, _, _) = ScriptedTransport::new(vec![Some(Ok("{}".into())), None]);
        let (mut fast, fast_sent, _) = ScriptedTransport::new(vec![
            Some(Ok("{}".into())),
            Some(Ok("{}".into())),
            None,
        ]);

        let started = std::time::Instant::now();
        let slow_driver = drive(0, &mut slow, interval);
        let fast_driver = async {
            let result = drive(1, &mut fast, Duration::ZERO).await;
            (result, started.elapsed())
        };

        let ((slow_moves, _), ((fast_moves, _), fast_elapsed)) =
            tokio::join!(slow_driver, fast_driver);

        assert_eq!(slow_moves, 1);
        assert_eq!(fast_moves, 2);
        assert_eq!(fast_sent.lock().unwrap().len(), 2);
        assert!(
            fast_elapsed < interval,
            "fast driver waited {fast_elapsed:?} behind the slow driver's pause"
        );
        assert!(started.elapsed() >= interval);
    }
}
