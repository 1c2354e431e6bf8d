//! Configuration management for the sensor console
//!
//! Loads configuration from config.toml with environment variable overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Complete console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub serial: SerialConfig,
    pub console: ConsoleConfig,
}

/// Serial link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path of the data interface (e.g. "/dev/ttyACM1")
    pub port: String,
    /// Line speed, 8N1 framing
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Delay before reopening the port after a failure
    pub reconnect_delay_ms: u64,
}

/// Console behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub channel_capacity: usize,
    /// Number of lines kept in the CMD tab status list
    pub status_history: usize,
}

fn default_baud_rate() -> u32 {
    115_200
}

impl SerialConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// Environment variables override config file values:
    /// - CONSOLE_SERIAL_PORT: Override the serial device path
    pub fn load(path: &str) -> Result<Self> {
        // Read config file
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        // Parse TOML
        let mut config = Self::parse(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        // Override with environment variables
        if let Ok(port) = std::env::var("CONSOLE_SERIAL_PORT") {
            tracing::info!(port = %port, "Using CONSOLE_SERIAL_PORT from environment");
            config.serial.port = port;
        }

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    fn parse(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        // Validate serial line settings
        if self.serial.port.trim().is_empty() {
            anyhow::bail!("Serial port must not be empty");
        }

        if self.serial.baud_rate == 0 {
            anyhow::bail!("Serial baud_rate must be greater than 0");
        }

        if self.serial.reconnect_delay_ms == 0 {
            anyhow::bail!("Serial reconnect_delay_ms must be greater than 0");
        }

        // Validate console sizes
        if self.console.channel_capacity == 0 {
            anyhow::bail!("Console channel_capacity must be greater than 0");
        }

        if self.console.status_history == 0 {
            anyhow::bail!("Console status_history must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = Config {
            serial: SerialConfig {
                port: "/dev/ttyACM1".to_string(),
                baud_rate: 115_200,
                reconnect_delay_ms: 5_000,
            },
            console: ConsoleConfig {
                channel_capacity: 100,
                status_history: 4,
            },
        };

        assert!(config.validate().is_ok());

        config.serial.port = "  ".to_string();
        assert!(config.validate().is_err());
        config.serial.port = "/dev/ttyACM1".to_string();

        config.serial.baud_rate = 0;
        assert!(config.validate().is_err());
        config.serial.baud_rate = 115_200;

        config.serial.reconnect_delay_ms = 0;
        assert!(config.validate().is_err());
        config.serial.reconnect_delay_ms = 5_000;

        config.console.channel_capacity = 0;
        assert!(config.validate().is_err());
        config.console.channel_capacity = 100;

        config.console.status_history = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_sample_config() {
        let config = Config::parse(include_str!("../config.toml")).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM1");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.console.status_history, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_baud_rate_defaults_to_115200() {
        let config = Config::parse(
            "[serial]\nport = \"/dev/ttyUSB0\"\nreconnect_delay_ms = 10\n\n[console]\nchannel_capacity = 8\nstatus_history = 4\n",
        )
        .unwrap();
        assert_eq!(config.serial.baud_rate, 115_200);
    }

    #[test]
    fn test_parse_rejects_missing_section() {
        assert!(Config::parse("[serial]\nport = \"/dev/ttyUSB0\"\nreconnect_delay_ms = 10\n").is_err());
    }
}
