//! MQTT link error types.

use thiserror::Error;

/// MQTT link error type.
#[derive(Debug, Error)]
pub enum MqttError {
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// Result type for MQTT link operations.
pub type MqttResult<T> = Result<T, MqttError>;
