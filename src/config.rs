//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so a missing file section (or no file at all)
//! falls back to the values the sensor firmware is built for.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Baud rates accepted for the sensor link
const SUPPORTED_BAUD_RATES: &[u32] = &[9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];

/// Largest ring buffer the viewer will allocate
const MAX_CAPACITY: usize = 1_000_000;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,
}

/// Sample buffer configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BufferConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Display configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

// Default value functions
fn default_serial_port() -> String {
    let port = if cfg!(windows) { "COM3" } else { "/dev/ttyACM0" };
    port.to_string()
}
fn default_baud_rate() -> u32 { 115200 }
fn default_timeout_ms() -> u64 { 1000 }
fn default_idle_backoff_ms() -> u64 { 2 }

fn default_capacity() -> usize { 600 }

fn default_title() -> String { "Real-time IR".to_string() }
fn default_refresh_ms() -> u64 { 30 }
fn default_log_interval_ms() -> u64 { 1000 }
fn default_shutdown_grace_ms() -> u64 { 1000 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            idle_backoff_ms: default_idle_backoff_ms(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { capacity: default_capacity() }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            refresh_ms: default_refresh_ms(),
            log_interval_ms: default_log_interval_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl SerialConfig {
    /// Read timeout applied to the opened device
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sleep between polls when no bytes are waiting
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }
}

impl DisplayConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ir_monitor::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.trim().is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            let rates: Vec<String> = SUPPORTED_BAUD_RATES.iter().map(u32::to_string).collect();
            return Err(invalid(format!("baud_rate must be one of: {}", rates.join(", "))));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.serial.idle_backoff_ms == 0 || self.serial.idle_backoff_ms > 1000 {
            return Err(invalid("idle_backoff_ms must be between 1 and 1000"));
        }

        if self.buffer.capacity == 0 || self.buffer.capacity > MAX_CAPACITY {
            return Err(invalid(format!("capacity must be between 1 and {}", MAX_CAPACITY)));
        }

        if self.display.title.is_empty() {
            return Err(invalid("display title cannot be empty"));
        }

        if self.display.refresh_ms == 0 || self.display.refresh_ms > 1000 {
            return Err(invalid("refresh_ms must be between 1 and 1000"));
        }

        if self.display.log_interval_ms == 0 || self.display.log_interval_ms > 60000 {
            return Err(invalid("log_interval_ms must be between 1 and 60000"));
        }

        if self.display.shutdown_grace_ms > 10000 {
            return Err(invalid("shutdown_grace_ms must be at most 10000"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> MonitorError {
    MonitorError::Config(toml::de::Error::custom(msg))
}
