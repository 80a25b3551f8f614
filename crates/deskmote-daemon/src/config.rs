//! Daemon configuration.
//!
//! Loaded once at startup from environment variables and validated eagerly;
//! the rest of the daemon trusts the resulting struct. Variable names are
//! kept from earlier deployments (`MQTT_BROKER_ADDR` etc.).

use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Default relative volume step.
const DEFAULT_VOLUME_STEP: u8 = 10;

/// Validated daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// MQTT broker host name or address.
    pub broker_addr: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// Broker username, when the broker requires authentication.
    pub username: Option<String>,
    /// Broker password, when the broker requires authentication.
    pub password: Option<String>,
    /// Topic on which commands are received.
    pub control_topic: String,
    /// Topic on which status snapshots are published.
    pub status_topic: String,
    /// Step for relative volume commands, `1..=100`.
    pub volume_step: u8,
    /// Interval between periodic status updates; `None` disables them.
    pub status_update_delay: Option<Duration>,
    /// Verbose logging.
    pub debug: bool,
}

impl Config {
    /// Load and validate the configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error naming the offending variable if a required value
    /// is missing, empty, or out of range.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate the configuration from an arbitrary lookup.
    ///
    /// # Errors
    /// Same conditions as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            broker_addr: required_string(&lookup, "MQTT_BROKER_ADDR")?,
            broker_port: required_string(&lookup, "MQTT_BROKER_PORT")?
                .parse()
                .context("'MQTT_BROKER_PORT' should be a valid port number")?,
            username: lookup("MQTT_BROKER_USER"),
            password: lookup("MQTT_BROKER_PWD"),
            control_topic: required_string(&lookup, "MQTT_CONTROL_TOPIC")?,
            status_topic: required_string(&lookup, "MQTT_STATUS_TOPIC")?,
            volume_step: volume_step(&lookup)?,
            status_update_delay: status_update_delay(&lookup)?,
            debug: lookup("DEBUG").is_some_and(|v| truthy(&v)),
        })
    }

    /// Username/password pair, present only when both are set.
    ///
    /// Authentication is applied to the broker connection only when both
    /// halves are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}

fn required_string(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    let value = lookup(key).with_context(|| format!("'{key}' is not set"))?;
    if value.is_empty() {
        bail!("'{key}' should be a not empty string");
    }
    Ok(value)
}

/// `VOLUME_STEP`, `1..=100`, defaulting to 10.
fn volume_step(lookup: impl Fn(&str) -> Option<String>) -> Result<u8> {
    let Some(raw) = lookup("VOLUME_STEP") else {
        return Ok(DEFAULT_VOLUME_STEP);
    };
    let step: u8 =
        raw.parse().context("'VOLUME_STEP' should be a valid integer literal")?;
    if !(1..=100).contains(&step) {
        bail!("'VOLUME_STEP' must be a value between 1 and 100, extremes included");
    }
    Ok(step)
}

/// `STATUS_UPDATE_DELAY` in seconds; absent disables periodic updates.
fn status_update_delay(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Duration>> {
    let Some(raw) = lookup("STATUS_UPDATE_DELAY") else {
        return Ok(None);
    };
    let seconds: u64 = raw
        .parse()
        .context("'STATUS_UPDATE_DELAY' must be a non-negative integer literal")?;
    Ok(Some(Duration::from_secs(seconds)))
}

fn truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
