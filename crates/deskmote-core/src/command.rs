//! Command decoding and schema validation.
//!
//! Inbound payloads are JSON objects carrying exactly one of four command
//! keys. The keys are scanned in fixed priority order (`volume`,
//! `volumeCtrl`, `mute`, `toggle`); the first recognized key selects the
//! schema and any remaining keys are ignored. This ordering is the sole
//! tie-break rule for multi-key payloads and must not change.
//!
//! Supported payloads:
//!
//! ```json
//! {"volume": 100}
//! {"volumeCtrl": "+"}
//! {"mute": true}
//! {"toggle": "pause"}
//! ```

use serde_json::{Map, Value};

use crate::error::DecodeError;

/// One decoded, validated user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Set the volume to an absolute percentage.
    SetVolume(u8),
    /// Step the volume up or down by the configured step.
    StepVolume(Direction),
    /// Set the mute state.
    SetMute(bool),
    /// Toggle a target with no absolute argument.
    Toggle(Target),
}

/// Direction of a relative volume step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Target of a toggle command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Mute,
    Pause,
}

/// Decode a raw message payload into a [`Command`].
///
/// # Errors
/// Returns [`DecodeError::Encoding`] if the payload is not UTF-8,
/// [`DecodeError::MalformedJson`] if it is not a JSON object,
/// [`DecodeError::Validation`] if a recognized key carries a value outside
/// its schema, and [`DecodeError::UnrecognizedCommand`] if no recognized
/// key is present.
pub fn decode(payload: &[u8]) -> Result<Command, DecodeError> {
    let text = std::str::from_utf8(payload)?;

    let value: Value = serde_json::from_str(text)
        .map_err(|e| DecodeError::MalformedJson(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(DecodeError::MalformedJson(format!(
            "expected a JSON object, got: {text}"
        )));
    };

    if let Some(value) = object.get("volume") {
        return validate_volume(value);
    }
    if let Some(value) = object.get("volumeCtrl") {
        return validate_volume_ctrl(value);
    }
    if let Some(value) = object.get("mute") {
        return validate_mute(value);
    }
    if let Some(value) = object.get("toggle") {
        return validate_toggle(value);
    }

    Err(DecodeError::UnrecognizedCommand(render(&object)))
}

/// Integer in [0,100]. Floats and numeric strings are rejected.
fn validate_volume(value: &Value) -> Result<Command, DecodeError> {
    value
        .as_i64()
        .filter(|v| (0..=100).contains(v))
        .map(|v| Command::SetVolume(v as u8))
        .ok_or(DecodeError::Validation {
            key: "volume",
            expected: "an integer between 0 and 100",
        })
}

/// String, exactly `"+"` or `"-"`.
fn validate_volume_ctrl(value: &Value) -> Result<Command, DecodeError> {
    match value.as_str() {
        Some("+") => Ok(Command::StepVolume(Direction::Up)),
        Some("-") => Ok(Command::StepVolume(Direction::Down)),
        _ => Err(DecodeError::Validation {
            key: "volumeCtrl",
            expected: "one of \"+\", \"-\"",
        }),
    }
}

/// Boolean literal only. `0`/`1` and `"true"`/`"false"` are rejected.
fn validate_mute(value: &Value) -> Result<Command, DecodeError> {
    value.as_bool().map(Command::SetMute).ok_or(DecodeError::Validation {
        key: "mute",
        expected: "a boolean literal",
    })
}

/// String, exactly `"mute"` or `"pause"` (case-sensitive).
fn validate_toggle(value: &Value) -> Result<Command, DecodeError> {
    match value.as_str() {
        Some("mute") => Ok(Command::Toggle(Target::Mute)),
        Some("pause") => Ok(Command::Toggle(Target::Pause)),
        _ => Err(DecodeError::Validation {
            key: "toggle",
            expected: "one of \"mute\", \"pause\"",
        }),
    }
}

fn render(object: &Map<String, Value>) -> String {
    serde_json::to_string(object).unwrap_or_else(|_| format!("{object:?}"))
}
