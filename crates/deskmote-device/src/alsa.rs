//! ALSA mixer control.
//!
//! Volume and mute go through `amixer` on the default card, so no native
//! ALSA binding is needed. Output like `[57%]` and `[on]`/`[off]` is parsed
//! from `sget`.

use std::process::Command;

use deskmote_core::error::DeviceError;
use tracing::debug;

/// ALSA-based volume and mute control for one mixer control.
pub struct AlsaMixer {
    control: String,
}

impl AlsaMixer {
    /// Mixer control used when none is configured.
    pub const DEFAULT_CONTROL: &'static str = "Master";

    /// Create a mixer handle for the given simple control (e.g. `Master`).
    #[must_use]
    pub fn new(control: String) -> Self {
        Self { control }
    }

    /// Read the current volume percentage.
    ///
    /// # Errors
    /// Returns an error if `amixer` fails or its output cannot be parsed.
    pub fn volume(&self) -> Result<u8, DeviceError> {
        let stdout = self.amixer(&["sget", &self.control])?;
        parse_volume(&stdout).ok_or_else(|| {
            DeviceError::Mixer(format!("cannot parse volume from amixer output: {stdout}"))
        })
    }

    /// Set the volume percentage.
    ///
    /// # Errors
    /// Returns an error if `amixer` fails.
    pub fn set_volume(&self, value: u8) -> Result<(), DeviceError> {
        self.amixer(&["sset", &self.control, &format!("{value}%")])?;
        debug!(volume = value, control = %self.control, "Volume set via ALSA");
        Ok(())
    }

    /// Read the current mute state.
    ///
    /// # Errors
    /// Returns an error if `amixer` fails or its output cannot be parsed.
    pub fn mute(&self) -> Result<bool, DeviceError> {
        let stdout = self.amixer(&["sget", &self.control])?;
        parse_mute(&stdout).ok_or_else(|| {
            DeviceError::Mixer(format!("cannot parse mute state from amixer output: {stdout}"))
        })
    }

    /// Set the mute state.
    ///
    /// # Errors
    /// Returns an error if `amixer` fails.
    pub fn set_mute(&self, value: bool) -> Result<(), DeviceError> {
        let state = if value { "mute" } else { "unmute" };
        self.amixer(&["sset", &self.control, state])?;
        debug!(muted = value, control = %self.control, "Mute set via ALSA");
        Ok(())
    }

    fn amixer(&self, args: &[&str]) -> Result<String, DeviceError> {
        let output = Command::new("amixer")
            .args(args)
            .output()
            .map_err(|e| DeviceError::Mixer(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceError::Mixer(format!("amixer failed: {stderr}")));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extract the first `[NN%]` token from `amixer sget` output.
fn parse_volume(stdout: &str) -> Option<u8> {
    for part in stdout.split_whitespace() {
        if part.starts_with('[') && part.ends_with("%]") {
            let percent = part.trim_start_matches('[').trim_end_matches("%]");
            if let Ok(percent) = percent.parse::<u8>() {
                return Some(percent.min(100));
            }
        }
    }
    None
}

/// Extract the `[on]`/`[off]` switch state from `amixer sget` output.
fn parse_mute(stdout: &str) -> Option<bool> {
    if stdout.contains("[off]") {
        Some(true)
    } else if stdout.contains("[on]") {
        Some(false)
    } else {
        None
    }
}
