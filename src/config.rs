//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub link: LinkConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_read_buffer")]
    pub read_buffer: usize,
}

/// Frame-synchronization link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    /// Largest tolerated gap between byte deliveries before a partial
    /// frame is discarded, in milliseconds
    #[serde(default = "default_max_gap_ms")]
    pub max_gap_ms: u64,

    /// Suppress frames identical to the previously delivered one
    #[serde(default = "default_dedup")]
    pub dedup: bool,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 100_000 }
fn default_read_buffer() -> usize { 256 }

fn default_max_gap_ms() -> u64 { 3 }
fn default_dedup() -> bool { true }

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
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::SbusBridgeError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        // SBUS is specified at 100,000 baud; anything else cannot interoperate
        if self.serial.baud_rate != 100_000 {
            return Err(crate::error::SbusBridgeError::Config(
                toml::de::Error::custom("baud_rate must be 100000 (SBUS line rate)")
            ));
        }

        // The buffer must at least hold one complete frame per read
        if self.serial.read_buffer < 25 || self.serial.read_buffer > 4096 {
            return Err(crate::error::SbusBridgeError::Config(
                toml::de::Error::custom("read_buffer must be between 25 and 4096")
            ));
        }

        if self.link.max_gap_ms == 0 || self.link.max_gap_ms > 1000 {
            return Err(crate::error::SbusBridgeError::Config(
                toml::de::Error::custom("max_gap_ms must be between 1 and 1000")
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig {
                port: default_serial_port(),
                baud_rate: default_baud_rate(),
                read_buffer: default_read_buffer(),
            },
            link: LinkConfig {
                max_gap_ms: default_max_gap_ms(),
                dedup: default_dedup(),
            },
        }
    }
}
