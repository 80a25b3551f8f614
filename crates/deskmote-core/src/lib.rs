//! Deskmote Core - command decoding, dispatch, and status reporting.
//!
//! This crate contains the transport-free heart of the bridge: the command
//! schema set, the payload decoder, the action executor, the status
//! reporter, and the per-message dispatch state machine. The broker and the
//! actual mixer/keyboard are reached only through the [`StatusPublisher`]
//! and [`DeviceControl`] traits, implemented by the sibling crates.

pub mod command;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod status;

pub use command::{Command, Direction, Target};
pub use device::{DeviceControl, Key};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{DecodeError, DeviceError, PublishRejected};
pub use status::{DeviceStatus, StatusPublisher};
