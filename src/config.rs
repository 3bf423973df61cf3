//! Configuration for the MR60BHA2 driver and monitor daemon
//!
//! Loads configuration from a TOML file. Every field has a default so a
//! partial file (or none at all) is enough to get started.

use crate::error::{Error, Result};
use crate::protocol::constants::{DEFAULT_MAX_PAYLOAD_LEN, PAYLOAD_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default serial port (Raspberry Pi primary UART)
pub const DEFAULT_PORT: &str = "/dev/serial0";

/// Default baud rate of the MR60BHA2 UART
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub sensor: SensorConfig,
    pub logging: LoggingConfig,
}

/// Sensor link and polling configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Serial port path (e.g. "/dev/ttyUSB0")
    pub port: String,
    /// UART baud rate
    pub baud_rate: u32,
    /// Budget for a single `update` call in milliseconds
    pub update_timeout_ms: u64,
    /// Budget for `wait_for_*` calls in milliseconds
    pub wait_timeout_ms: u64,
    /// Pause between polls inside `wait_for_*` in milliseconds
    pub poll_interval_ms: u64,
    /// Largest LEN field accepted before the synchronizer resyncs
    pub max_payload_len: usize,
}

impl SensorConfig {
    /// Reject values the driver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.port.is_empty() {
            return Err(Error::InvalidParameter("port must not be empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(Error::InvalidParameter("baud_rate must be > 0".into()));
        }
        if self.max_payload_len == 0 || self.max_payload_len > PAYLOAD_CAPACITY {
            return Err(Error::InvalidParameter(format!(
                "max_payload_len must be in 1..={}, got {}",
                PAYLOAD_CAPACITY, self.max_payload_len
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_timeout_ms)
    }

    #[inline]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            update_timeout_ms: 100,
            wait_timeout_ms: 5000,
            poll_interval_ms: 10,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use mr60bha2_io::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("mr60bha2.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.sensor.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
