//! Wire types for the Pong movement protocol.
//!
//! The server pushes arbitrary JSON objects (ball positions, scores, room
//! updates). The client never inspects them beyond checking that they parse.
//! The only message the client sends is a paddle move:
//!
//! ```json
//! {"type":"move","direction":"up"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Upper bound (exclusive) of a [`random_draw`].
pub const DRAW_RANGE: f64 = 100.0;

/// Paddle direction carried by a [`MoveCommand`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Move the paddle towards the top of the canvas.
    Up,
    /// Move the paddle towards the bottom of the canvas.
    Down,
}

impl Direction {
    /// Map a draw from [`random_draw`] to a direction.
    ///
    /// `Up` only when the draw is exactly an even number. Draws are
    /// fractional, so in practice this returns `Down` almost always.
    ///
    /// ```
    /// use pong_bot_client::protocol::Direction;
    ///
    /// assert_eq!(Direction::from_draw(4.0), Direction::Up);
    /// assert_eq!(Direction::from_draw(4.25), Direction::Down);
    /// ```
    pub fn from_draw(draw: f64) -> Self {
        if draw % 2.0 == 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages sent from the client to the server.
///
/// Internally tagged on `type`, so the single variant encodes as
/// `{"type":"move","direction":...}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MoveCommand {
    /// Nudge this client's paddle one step.
    Move { direction: Direction },
}

impl MoveCommand {
    /// Build a move in the given direction.
    pub fn new(direction: Direction) -> Self {
        Self::Move { direction }
    }

    /// Build a move from a fresh [`random_draw`].
    pub fn random() -> Self {
        Self::new(Direction::from_draw(random_draw()))
    }

    /// The direction of this move.
    pub fn direction(&self) -> Direction {
        match self {
            Self::Move { direction } => *direction,
        }
    }

    /// Encode as a JSON text frame payload.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Serialization`](crate::DriverError::Serialization)
    /// if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Uniform pseudo-random draw in `[0, DRAW_RANGE)` from the thread RNG.
pub fn random_draw() -> f64 {
    rand::random::<f64>() * DRAW_RANGE
}

/// Decode an inbound text frame into a structured payload.
///
/// Any JSON value is accepted; the payload is not validated against a schema.
///
/// # Errors
///
/// Returns [`DriverError::Serialization`](crate::DriverError::Serialization)
/// if `text` is not valid JSON.
pub fn decode_inbound(text: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(text)?)
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
    use crate::error::DriverError;

    #[test]
    fn even_integer_draws_go_up() {
        for draw in [0.0, 2.0, 48.0, 98.0] {
            assert_eq!(Direction::from_draw(draw), Direction::Up, "draw {draw}");
        }
    }

    #[test]
    fn odd_and_fractional_draws_go_down() {
        for draw in [1.0, 3.0, 0.5, 2.000_001, 99.999] {
            assert_eq!(Direction::from_draw(draw), Direction::Down, "draw {draw}");
        }
    }

    #[test]
    fn random_draw_stays_in_range() {
        for _ in 0..1_000 {
            let draw = random_draw();
            assert!((0.0..DRAW_RANGE).contains(&draw), "draw {draw} out of range");
        }
    }

    #[test]
    fn move_command_wire_format() {
        let json = MoveCommand::new(Direction::Down).to_json().unwrap();
        assert_eq!(json, r#"{"type":"move","direction":"down"}"#);

        let json = MoveCommand::new(Direction::Up).to_json().unwrap();
        assert_eq!(json, r#"{"type":"move","direction":"up"}"#);
    }

    #[test]
    fn move_command_rejects_unknown_direction() {
        let result = serde_json::from_str::<MoveCommand>(r#"{"type":"move","direction":"left"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn decode_inbound_accepts_any_json() {
        let value = decode_inbound(r#"{"value": 1}"#).unwrap();
        assert_eq!(value["value"], 1);

        assert!(decode_inbound("[1, 2, 3]").unwrap().is_array());
        assert!(decode_inbound("null").unwrap().is_null());
    }

    #[test]
    fn decode_inbound_rejects_garbage() {
        let err = decode_inbound("hello").unwrap_err();
        assert!(matches!(err, DriverError::Serialization(_)));
    }

    #[test]
    fn direction_display_matches_wire_name() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Down.to_string(), "down");
    }
}
