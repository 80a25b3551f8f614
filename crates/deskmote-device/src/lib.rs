//! Deskmote Device - local mixer and keyboard backends.
//!
//! Implements the core's [`DeviceControl`] boundary on top of `amixer`
//! (volume/mute) and `xdotool` (key injection).

pub mod alsa;
pub mod keyboard;

use deskmote_core::device::{DeviceControl, Key};
use deskmote_core::error::DeviceError;

pub use alsa::AlsaMixer;
pub use keyboard::Keyboard;

/// The local desktop as one device: audio mixer plus keyboard.
pub struct DesktopDevice {
    mixer: AlsaMixer,
    keyboard: Keyboard,
}

impl DesktopDevice {
    /// Create a device handle over the given mixer control.
    #[must_use]
    pub fn new(mixer_control: String) -> Self {
        Self { mixer: AlsaMixer::new(mixer_control), keyboard: Keyboard }
    }
}

impl Default for DesktopDevice {
    fn default() -> Self {
        Self::new(AlsaMixer::DEFAULT_CONTROL.to_string())
    }
}

impl DeviceControl for DesktopDevice {
    fn volume(&self) -> Result<u8, DeviceError> {
        self.mixer.volume()
    }

    fn set_volume(&self, value: u8) -> Result<(), DeviceError> {
        self.mixer.set_volume(value)
    }

    fn mute(&self) -> Result<bool, DeviceError> {
        self.mixer.mute()
    }

    fn set_mute(&self, value: bool) -> Result<(), DeviceError> {
        self.mixer.set_mute(value)
    }

    fn press_and_release(&self, key: Key) -> Result<(), DeviceError> {
        self.keyboard.press_and_release(key)
    }
}
