//! Broker link implementation.
//!
//! [`MqttLink::connect`] hands back the link plus a channel of raw control
//! payloads; [`MqttLink::run`] drives the rumqttc event loop, re-subscribing
//! to the control topic on every (re)connection and forwarding inbound
//! publishes. Outbound status updates go through [`MqttPublisher`], a
//! fire-and-forget wrapper that the core sees as its
//! [`StatusPublisher`](deskmote_core::StatusPublisher) boundary.

use std::time::Duration;

use deskmote_core::error::PublishRejected;
use deskmote_core::status::StatusPublisher;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{MqttError, MqttResult};

/// Validated connection parameters for the broker link.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Broker host name or address.
    pub broker_addr: String,
    /// Broker port.
    pub broker_port: u16,
    /// Username and password, applied together or not at all.
    pub credentials: Option<(String, String)>,
    /// Topic to subscribe to for inbound commands.
    pub control_topic: String,
}

/// Connection to the broker: control-topic subscription plus publishing.
pub struct MqttLink {
    client: AsyncClient,
    event_loop: EventLoop,
    control_topic: String,
    message_tx: mpsc::Sender<Vec<u8>>,
}

/// Keepalive matching the original deployment.
const KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Pause before re-polling after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

impl MqttLink {
    /// Create a link to the broker.
    ///
    /// Returns the link and the receiver on which raw control-topic
    /// payloads are delivered, one per message. The connection itself is
    /// established lazily by [`run`](Self::run).
    #[must_use]
    pub fn connect(options: &LinkOptions) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let mut mqtt_options =
            MqttOptions::new("deskmote", &options.broker_addr, options.broker_port);
        mqtt_options.set_keep_alive(KEEP_ALIVE);
        if let Some((user, password)) = &options.credentials {
            mqtt_options.set_credentials(user, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 16);
        let (message_tx, message_rx) = mpsc::channel(64);

        (
            Self {
                client,
                event_loop,
                control_topic: options.control_topic.clone(),
                message_tx,
            },
            message_rx,
        )
    }

    /// Get a publisher handle for status updates.
    #[must_use]
    pub fn publisher(&self) -> MqttPublisher {
        MqttPublisher { client: self.client.clone() }
    }

    /// Drive the event loop until the payload receiver is dropped.
    ///
    /// Connection errors are logged and retried; they never reach the
    /// dispatcher.
    pub async fn run(mut self) {
        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    info!(code = ?ack.code, "Connected to the broker");
                    if let Err(e) = self.subscribe_control() {
                        warn!(error = %e, topic = %self.control_topic, "Control topic subscription rejected");
                    }
                }

                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    info!(return_codes = ?ack.return_codes, "Control topic subscription accepted");
                }

                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic != self.control_topic {
                        debug!(topic = %publish.topic, "Ignoring message on unexpected topic");
                        continue;
                    }
                    if self.message_tx.send(publish.payload.to_vec()).await.is_err() {
                        info!("Payload receiver dropped, stopping the link");
                        break;
                    }
                }

                Ok(event) => {
                    debug!(?event, "MQTT event");
                }

                Err(e) => {
                    error!(error = %e, "Connection error, retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    /// Request a QoS 0 subscription to the control topic.
    ///
    /// Called on every connection acknowledgment so the subscription
    /// survives reconnects.
    fn subscribe_control(&self) -> MqttResult<()> {
        self.client.try_subscribe(&self.control_topic, QoS::AtMostOnce)?;
        Ok(())
    }

}

/// Fire-and-forget status publisher over the shared client.
///
/// Publishes at QoS 0 with no retained flag; a full request queue is a
/// rejection, mirroring the transport accepting or declining the request.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Ask the broker for a clean disconnect.
    ///
    /// # Errors
    /// Returns an error if the request cannot be queued.
    pub async fn disconnect(&self) -> MqttResult<()> {
        self.client.disconnect().await.map_err(MqttError::from)
    }
}

impl StatusPublisher for MqttPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishRejected> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .map_err(|e| PublishRejected { reason: e.to_string() })
    }
}
