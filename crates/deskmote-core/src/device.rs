//! Device capability boundary.
//!
//! The dispatcher only ever talks to the local machine through this trait;
//! concrete mixer/keyboard backends live in the `deskmote-device` crate.

use crate::error::DeviceError;

/// Keys the dispatcher can ask the device to press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Space bar, the conventional media play/pause key.
    Space,
}

/// Abstract boundary to the local audio/input hardware.
///
/// Volume is an integer percentage in `0..=100`. Implementations do not need
/// to be internally synchronized: the dispatcher serializes all access,
/// including multi-call sequences such as a volume read-modify-write.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceControl {
    /// Read the current volume percentage.
    ///
    /// # Errors
    /// Returns a [`DeviceError`] if the mixer cannot be read.
    fn volume(&self) -> Result<u8, DeviceError>;

    /// Set the volume percentage.
    ///
    /// # Errors
    /// Returns a [`DeviceError`] if the mixer cannot be written.
    fn set_volume(&self, value: u8) -> Result<(), DeviceError>;

    /// Read the current mute state.
    ///
    /// # Errors
    /// Returns a [`DeviceError`] if the mixer cannot be read.
    fn mute(&self) -> Result<bool, DeviceError>;

    /// Set the mute state.
    ///
    /// # Errors
    /// Returns a [`DeviceError`] if the mixer cannot be written.
    fn set_mute(&self, value: bool) -> Result<(), DeviceError>;

    /// Press and release a key.
    ///
    /// # Errors
    /// Returns a [`DeviceError`] if the key press cannot be injected.
    fn press_and_release(&self, key: Key) -> Result<(), DeviceError>;
}
