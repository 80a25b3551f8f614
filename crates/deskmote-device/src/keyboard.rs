//! Simulated key presses.
//!
//! Injection goes through `xdotool`, which sends a press/release pair in
//! one invocation.

use std::process::Command;

use deskmote_core::device::Key;
use deskmote_core::error::DeviceError;
use tracing::debug;

/// Keyboard injection backend.
pub struct Keyboard;

impl Keyboard {
    /// Press and release a key.
    ///
    /// # Errors
    /// Returns an error if `xdotool` cannot be spawned or reports failure.
    pub fn press_and_release(&self, key: Key) -> Result<(), DeviceError> {
        let keysym = keysym(key);
        let output = Command::new("xdotool")
            .args(["key", keysym])
            .output()
            .map_err(|e| DeviceError::Input(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceError::Input(format!("xdotool failed: {stderr}")));
        }

        debug!(key = keysym, "Key press injected");
        Ok(())
    }
}

/// X11 keysym name for a [`Key`].
fn keysym(key: Key) -> &'static str {
    match key {
        Key::Space => "space",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_keysym() {
        assert_eq!(keysym(Key::Space), "space");
    }
}
