//! Deskmote MQTT - broker link for command delivery and status publishing.
//!
//! Wraps the rumqttc client: one subscription on the control topic whose
//! payloads are delivered as raw bytes over a channel, and a fire-and-forget
//! publisher for status snapshots.

pub mod client;
pub mod error;

pub use client::{LinkOptions, MqttLink, MqttPublisher};
pub use error::{MqttError, MqttResult};
