//! Status snapshots and the publish boundary.

use serde::{Deserialize, Serialize};

use crate::error::PublishRejected;

/// One point-in-time snapshot of the observable device state.
///
/// Read on demand, published, then discarded; never cached. There is no
/// play/pause field because no reliable source of truth for that state
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Volume percentage in `0..=100`.
    pub volume: u8,
    /// Whether the output is muted.
    pub mute: bool,
}

/// Fire-and-forget outbound publish boundary.
///
/// A call either hands the payload to the transport (accepted) or is
/// declined; there is no retry, persistence, or delivery guarantee beyond
/// the transport default.
#[cfg_attr(test, mockall::automock)]
pub trait StatusPublisher {
    /// Request a publish of `payload` on `topic`.
    ///
    /// # Errors
    /// Returns [`PublishRejected`] if the transport declines the request.
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishRejected>;
}
