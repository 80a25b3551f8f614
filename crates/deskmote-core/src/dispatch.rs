//! Per-message dispatch: decode, execute, report.
//!
//! The dispatcher is the only component with non-trivial failure handling.
//! Its contract is that [`Dispatcher::dispatch`] never panics and never
//! propagates an error: every failure is classified, logged with enough
//! context to identify the offending payload, and turned into a
//! [`DispatchOutcome`] so the caller is immediately ready for the next
//! message. Messages are independent; nothing is retried.

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::command::{Command, Direction, Target};
use crate::device::{DeviceControl, Key};
use crate::error::{DecodeError, DeviceError};
use crate::status::{DeviceStatus, StatusPublisher};

/// Terminal classification of one dispatched message.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The command executed; if it changed observable state, a status
    /// publish was attempted.
    Completed(Command),
    /// The payload never became a command; no action ran.
    DecodeFailed(DecodeError),
    /// The device failed while executing a decoded command.
    ExecutionFailed(DeviceError),
}

/// Orchestrates decode, execution, and status reporting for one message at
/// a time.
///
/// The device handle is behind a mutex so that multi-call sequences (the
/// read-modify-write of a volume step, the read-then-negate of a mute
/// toggle) are atomic with respect to the periodic status reporter and any
/// concurrent delivery the transport might do.
pub struct Dispatcher<D, P> {
    device: Mutex<D>,
    publisher: P,
    status_topic: String,
    volume_step: u8,
}

impl<D: DeviceControl, P: StatusPublisher> Dispatcher<D, P> {
    /// Create a dispatcher.
    ///
    /// `volume_step` is the configured step for relative volume commands;
    /// configuration is validated at load time, so it is trusted here.
    pub fn new(device: D, publisher: P, status_topic: String, volume_step: u8) -> Self {
        Self { device: Mutex::new(device), publisher, status_topic, volume_step }
    }

    /// Process one raw message payload to completion.
    ///
    /// Never panics and never returns an error to the caller; the outcome
    /// reports what happened for observability and tests.
    pub fn dispatch(&self, payload: &[u8]) -> DispatchOutcome {
        let command = match crate::command::decode(payload) {
            Ok(command) => command,
            Err(e) => {
                error!(
                    payload = %String::from_utf8_lossy(payload),
                    error = %e,
                    "Cannot decode message"
                );
                return DispatchOutcome::DecodeFailed(e);
            }
        };

        info!(?command, "Received command");

        match self.execute(command) {
            Ok(reports_status) => {
                if reports_status {
                    self.publish_status();
                }
                DispatchOutcome::Completed(command)
            }
            Err(e) => {
                error!(?command, error = %e, "Command execution failed");
                DispatchOutcome::ExecutionFailed(e)
            }
        }
    }

    /// Execute one command against the device.
    ///
    /// Returns whether the command changed observable state and should be
    /// followed by a status report. Holds the device lock for the whole
    /// command so read-modify-write sequences do not interleave.
    fn execute(&self, command: Command) -> Result<bool, DeviceError> {
        let device = self.device.lock();
        match command {
            Command::SetVolume(value) => {
                device.set_volume(value)?;
                Ok(true)
            }
            Command::StepVolume(Direction::Up) => {
                let current = device.volume()?;
                device.set_volume(current.saturating_add(self.volume_step).min(100))?;
                Ok(true)
            }
            Command::StepVolume(Direction::Down) => {
                let current = device.volume()?;
                device.set_volume(current.saturating_sub(self.volume_step))?;
                Ok(true)
            }
            Command::SetMute(value) => {
                device.set_mute(value)?;
                Ok(true)
            }
            Command::Toggle(Target::Mute) => {
                let muted = device.mute()?;
                device.set_mute(!muted)?;
                Ok(true)
            }
            Command::Toggle(Target::Pause) => {
                // Play/pause has no observable status, so no report follows.
                device.press_and_release(Key::Space)?;
                Ok(false)
            }
        }
    }

    /// Read the current device state and publish it on the status topic.
    ///
    /// Best effort: a device read failure or a rejected publish is logged
    /// and swallowed, never surfaced to the caller.
    pub fn publish_status(&self) {
        let status = {
            let device = self.device.lock();
            match self.read_status(&device) {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "Cannot read device status, skipping update");
                    return;
                }
            }
        };

        let payload = match serde_json::to_vec(&status) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Cannot serialize status update");
                return;
            }
        };

        match self.publisher.publish(&self.status_topic, &payload) {
            Ok(()) => {
                debug!(?status, topic = %self.status_topic, "Status update accepted");
            }
            Err(e) => {
                warn!(error = %e, "Status update rejected");
            }
        }
    }

    fn read_status(&self, device: &D) -> Result<DeviceStatus, DeviceError> {
        Ok(DeviceStatus { volume: device.volume()?, mute: device.mute()? })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use mockall::Sequence;
    use mockall::predicate::eq;

    use super::*;
    use crate::device::MockDeviceControl;
    use crate::status::MockStatusPublisher;

    const TOPIC: &str = "desktop/status";

    fn accepting_publisher(times: usize) -> MockStatusPublisher {
        let mut publisher = MockStatusPublisher::new();
        publisher.expect_publish().times(times).returning(|_, _| Ok(()));
        publisher
    }

    fn dispatcher(
        device: MockDeviceControl,
        publisher: MockStatusPublisher,
    ) -> Dispatcher<MockDeviceControl, MockStatusPublisher> {
        Dispatcher::new(device, publisher, TOPIC.to_string(), 10)
    }

    #[test]
    fn test_set_volume_executes_and_reports_once() {
        let mut device = MockDeviceControl::new();
        device.expect_set_volume().with(eq(70)).times(1).returning(|_| Ok(()));
        // Status report reads both values back.
        device.expect_volume().times(1).returning(|| Ok(70));
        device.expect_mute().times(1).returning(|| Ok(false));

        let mut publisher = MockStatusPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .withf(|topic, payload| {
                topic == TOPIC && payload == br#"{"volume":70,"mute":false}"#
            })
            .returning(|_, _| Ok(()));

        let outcome = dispatcher(device, publisher).dispatch(br#"{"volume": 70}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(Command::SetVolume(70)));
    }

    #[test]
    fn test_step_up_clamps_at_100() {
        let mut device = MockDeviceControl::new();
        let mut seq = Sequence::new();
        device
            .expect_volume()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(95));
        device
            .expect_set_volume()
            .with(eq(100))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        // Report reads.
        device.expect_volume().times(1).returning(|| Ok(100));
        device.expect_mute().times(1).returning(|| Ok(false));

        let outcome =
            dispatcher(device, accepting_publisher(1)).dispatch(br#"{"volumeCtrl": "+"}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(_));
    }

    #[test]
    fn test_step_down_clamps_at_0() {
        let mut device = MockDeviceControl::new();
        let mut seq = Sequence::new();
        device
            .expect_volume()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(5));
        device
            .expect_set_volume()
            .with(eq(0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        device.expect_volume().times(1).returning(|| Ok(0));
        device.expect_mute().times(1).returning(|| Ok(false));

        let outcome =
            dispatcher(device, accepting_publisher(1)).dispatch(br#"{"volumeCtrl": "-"}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(_));
    }

    #[test]
    fn test_step_up_from_middle_adds_step() {
        let mut device = MockDeviceControl::new();
        device.expect_volume().times(1).returning(|| Ok(40));
        device.expect_set_volume().with(eq(50)).times(1).returning(|_| Ok(()));
        device.expect_volume().times(1).returning(|| Ok(50));
        device.expect_mute().times(1).returning(|| Ok(false));

        let outcome =
            dispatcher(device, accepting_publisher(1)).dispatch(br#"{"volumeCtrl": "+"}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(_));
    }

    #[test]
    fn test_set_mute_is_idempotent() {
        // Two identical mute commands both set the same absolute state; the
        // current state is never read, so no toggling can sneak in.
        let mut device = MockDeviceControl::new();
        device.expect_set_mute().with(eq(true)).times(2).returning(|_| Ok(()));
        device.expect_volume().times(2).returning(|| Ok(30));
        device.expect_mute().times(2).returning(|| Ok(true));

        let dispatcher = dispatcher(device, accepting_publisher(2));
        assert_matches!(
            dispatcher.dispatch(br#"{"mute": true}"#),
            DispatchOutcome::Completed(Command::SetMute(true))
        );
        assert_matches!(
            dispatcher.dispatch(br#"{"mute": true}"#),
            DispatchOutcome::Completed(Command::SetMute(true))
        );
    }

    #[test]
    fn test_toggle_mute_negates_current_state() {
        let mut device = MockDeviceControl::new();
        let mut seq = Sequence::new();
        device.expect_mute().times(1).in_sequence(&mut seq).returning(|| Ok(false));
        device
            .expect_set_mute()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        device.expect_volume().times(1).returning(|| Ok(60));
        device.expect_mute().times(1).returning(|| Ok(true));

        let outcome =
            dispatcher(device, accepting_publisher(1)).dispatch(br#"{"toggle": "mute"}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(Command::Toggle(Target::Mute)));
    }

    #[test]
    fn test_toggle_pause_presses_space_and_never_reports() {
        let mut device = MockDeviceControl::new();
        device
            .expect_press_and_release()
            .with(eq(Key::Space))
            .times(1)
            .returning(|_| Ok(()));

        // Publisher expects zero calls; the mock fails the test otherwise.
        let outcome =
            dispatcher(device, accepting_publisher(0)).dispatch(br#"{"toggle": "pause"}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(Command::Toggle(Target::Pause)));
    }

    #[test]
    fn test_decode_failure_runs_no_action() {
        // No device or publisher expectations: any call fails the test.
        let device = MockDeviceControl::new();
        let dispatcher = dispatcher(device, accepting_publisher(0));

        assert_matches!(
            dispatcher.dispatch(br#"{"volume": 101}"#),
            DispatchOutcome::DecodeFailed(DecodeError::Validation { key: "volume", .. })
        );
        assert_matches!(
            dispatcher.dispatch(br#"{"msg": "hi"}"#),
            DispatchOutcome::DecodeFailed(DecodeError::UnrecognizedCommand(_))
        );
        assert_matches!(
            dispatcher.dispatch(b"not json"),
            DispatchOutcome::DecodeFailed(DecodeError::MalformedJson(_))
        );
        assert_matches!(
            dispatcher.dispatch(&[0xff, 0xfe]),
            DispatchOutcome::DecodeFailed(DecodeError::Encoding(_))
        );
    }

    #[test]
    fn test_device_failure_is_classified_not_propagated() {
        let mut device = MockDeviceControl::new();
        device
            .expect_set_volume()
            .times(1)
            .returning(|_| Err(DeviceError::Mixer("mixer unavailable".into())));

        let dispatcher = dispatcher(device, accepting_publisher(0));
        assert_matches!(
            dispatcher.dispatch(br#"{"volume": 10}"#),
            DispatchOutcome::ExecutionFailed(DeviceError::Mixer(_))
        );
    }

    #[test]
    fn test_rejected_publish_does_not_fail_dispatch() {
        let mut device = MockDeviceControl::new();
        device.expect_set_mute().times(1).returning(|_| Ok(()));
        device.expect_volume().times(1).returning(|| Ok(25));
        device.expect_mute().times(1).returning(|| Ok(false));

        let mut publisher = MockStatusPublisher::new();
        publisher.expect_publish().times(1).returning(|_, _| {
            Err(crate::error::PublishRejected { reason: "queue full".into() })
        });

        let outcome = dispatcher(device, publisher).dispatch(br#"{"mute": false}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(Command::SetMute(false)));
    }

    #[test]
    fn test_status_read_failure_skips_publish() {
        let mut device = MockDeviceControl::new();
        device.expect_set_volume().times(1).returning(|_| Ok(()));
        device
            .expect_volume()
            .times(1)
            .returning(|| Err(DeviceError::Mixer("gone".into())));

        let outcome =
            dispatcher(device, accepting_publisher(0)).dispatch(br#"{"volume": 10}"#);
        assert_matches!(outcome, DispatchOutcome::Completed(_));
    }

    #[test]
    fn test_periodic_report_goes_through_same_path() {
        let mut device = MockDeviceControl::new();
        device.expect_volume().times(1).returning(|| Ok(80));
        device.expect_mute().times(1).returning(|| Ok(true));

        let mut publisher = MockStatusPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .withf(|topic, payload| {
                topic == TOPIC && payload == br#"{"volume":80,"mute":true}"#
            })
            .returning(|_, _| Ok(()));

        dispatcher(device, publisher).publish_status();
    }
}
