//! Error types for Deskmote core.

use thiserror::Error;

/// Failure to turn a raw payload into a [`crate::Command`].
///
/// Every variant is non-fatal: the dispatcher logs it and moves on to the
/// next message.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("payload is not a JSON object: {0}")]
    MalformedJson(String),

    #[error("invalid value for '{key}': expected {expected}")]
    Validation {
        /// The recognized command key whose value failed validation.
        key: &'static str,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },

    #[error("not a valid command: {0}")]
    UnrecognizedCommand(String),
}

/// Failure reported by the device capability layer.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("audio mixer error: {0}")]
    Mixer(String),

    #[error("input injection error: {0}")]
    Input(String),
}

/// The transport declined to accept a status publish request.
///
/// Logged by the status reporter, never escalated to the dispatcher.
#[derive(Debug, Error)]
#[error("status publish rejected: {reason}")]
pub struct PublishRejected {
    /// Why the transport declined the request.
    pub reason: String,
}
