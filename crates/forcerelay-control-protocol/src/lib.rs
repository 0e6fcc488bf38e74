//! Actuator control protocol: command text and magnitude translation.
//!
//! The external actuator understands exactly two datagram texts:
//!
//! ```text
//! CONST <n>    hold constant force at n percent, n in [-100, 100]
//! STOP         cease force output immediately
//! ```
//!
//! Every message is a complete, idempotent state assertion, so the channel
//! that carries them needs no ordering or delivery guarantee. This crate is
//! pure and I/O-free; the datagram channel lives elsewhere.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default actuator host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default actuator port.
pub const DEFAULT_PORT: u16 = 21999;

/// Full scale of the host's magnitude unit (ten-thousandths).
pub const MAGNITUDE_FULL_SCALE: i32 = 10_000;

/// Full scale of the actuator's percentage unit.
pub const COMMAND_FULL_SCALE: i32 = 100;

/// One actuator command, as carried in a single datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCommand {
    /// Hold constant force at the given percentage.
    Const(i8),
    /// Cease force output.
    Stop,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(percent) => write!(f, "CONST {percent}"),
            Self::Stop => write!(f, "STOP"),
        }
    }
}

impl ControlCommand {
    /// Encode to the datagram text.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse a datagram text back into a command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError`] for unknown verbs, a missing or
    /// non-numeric value, or a value outside [-100, 100].
    pub fn parse(text: &str) -> Result<Self, CommandParseError> {
        let trimmed = text.trim();
        if trimmed == "STOP" {
            return Ok(Self::Stop);
        }
        if let Some(value) = trimmed.strip_prefix("CONST ") {
            let percent: i32 = value
                .trim()
                .parse()
                .map_err(|_| CommandParseError::BadValue(value.trim().to_string()))?;
            if !(-COMMAND_FULL_SCALE..=COMMAND_FULL_SCALE).contains(&percent) {
                return Err(CommandParseError::OutOfRange(percent));
            }
            return Ok(Self::Const(percent as i8));
        }
        Err(CommandParseError::UnknownVerb(trimmed.to_string()))
    }
}

/// Failure to parse a datagram text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    /// The text started with neither `STOP` nor `CONST `.
    #[error("unknown command verb: {0:?}")]
    UnknownVerb(String),
    /// The `CONST` value was missing or not an integer.
    #[error("bad constant-force value: {0:?}")]
    BadValue(String),
    /// The `CONST` value was outside the accepted range.
    #[error("constant-force value {0} outside [-100, 100]")]
    OutOfRange(i32),
}

/// Translate a host magnitude (ten-thousandths, signed) into a command.
///
/// The magnitude is scaled to percent with truncating integer division and
/// clamped to [-100, 100]. A scaled value of zero becomes [`ControlCommand::Stop`],
/// so a zero-force assertion and an explicit stop are indistinguishable on
/// the wire, which is what the actuator expects.
pub fn const_command(magnitude: i32) -> ControlCommand {
    let scaled = (magnitude / (MAGNITUDE_FULL_SCALE / COMMAND_FULL_SCALE))
        .clamp(-COMMAND_FULL_SCALE, COMMAND_FULL_SCALE);
    if scaled == 0 {
        ControlCommand::Stop
    } else {
        ControlCommand::Const(scaled as i8)
    }
}

/// The unconditional stop command.
pub fn stop_command() -> ControlCommand {
    ControlCommand::Stop
}
