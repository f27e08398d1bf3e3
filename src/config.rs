//! # Configuration Management
//!
//! Centralized configuration for the gate server and the test client.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`GATE_*` variables)
//!
//! ## Example
//! ```toml
//! [server]
//! address = "0.0.0.0:4444"
//! replay_ttl = 300000
//!
//! [[devices]]
//! id = "aa:bb:cc:dd:ee:ff"
//! key = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
//! ```
//!
//! ## Security Considerations
//! - Device keys live in the config only for small deployments; larger ones
//!   plug their own [`KeyStore`](crate::protocol::keys::KeyStore)
//! - Replay protection is on by default and its TTL should exceed the longest
//!   time a captured datagram could plausibly be held back

use crate::core::codec::Key;
use crate::core::device_id::DeviceId;
use crate::error::{ProtocolError, Result};
use crate::protocol::keys::MemoryKeyStore;
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Current supported protocol version
pub const PROTOCOL_VERSION: u8 = 1;

/// Largest datagram either side will send or accept
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GateConfig {
    /// Server-specific configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Client-specific configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Known controllers and their keys
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

impl GateConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `GATE_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("GATE_SERVER_ADDRESS") {
            self.server.address = addr;
        }

        if let Ok(addr) = std::env::var("GATE_CLIENT_ADDRESS") {
            self.client.address = addr;
        }

        if let Ok(timeout) = std::env::var("GATE_RESPONSE_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                self.client.response_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(ttl) = std::env::var("GATE_REPLAY_TTL_MS") {
            if let Ok(val) = ttl.parse::<u64>() {
                self.server.replay_ttl = Duration::from_millis(val);
            }
        }

        if let Ok(level) = std::env::var("GATE_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                self.logging.log_level = val;
            }
        }
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        let mut config = Self::default();
        config.devices.push(DeviceEntry {
            id: "aa:bb:cc:dd:ee:ff".to_string(),
            key: "00".repeat(32),
        });
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Build the in-memory key store from the `[[devices]]` table
    pub fn key_store(&self) -> Result<MemoryKeyStore> {
        let mut store = MemoryKeyStore::new();
        for entry in &self.devices {
            let (id, key) = entry.parse()?;
            store.insert(id, key);
        }
        Ok(store)
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.client.validate());
        errors.extend(self.logging.validate());

        let mut seen = HashSet::new();
        for entry in &self.devices {
            match entry.parse() {
                Ok((id, _)) => {
                    if !seen.insert(id) {
                        errors.push(format!("Duplicate device entry: {id}"));
                    }
                }
                Err(e) => errors.push(format!("Invalid device entry '{}': {e}", entry.id)),
            }
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Server-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// UDP listen address (e.g., "0.0.0.0:4444")
    pub address: String,

    /// Whether to reject requests whose nonce was already accepted
    pub replay_protection: bool,

    /// How long an accepted nonce is remembered
    #[serde(with = "duration_serde")]
    pub replay_ttl: Duration,

    /// Upper bound on remembered nonces
    pub replay_max_entries: usize,

    /// Interval between metrics log lines
    #[serde(with = "duration_serde")]
    pub metrics_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:4444"),
            replay_protection: true,
            replay_ttl: Duration::from_secs(300),
            replay_max_entries: 10_000,
            metrics_interval: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Server address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid server address format: '{}' (expected format: '0.0.0.0:4444')",
                self.address
            ));
        }

        if self.replay_protection {
            if self.replay_ttl.as_secs() < 1 {
                errors.push("Replay TTL too short (minimum: 1s)".to_string());
            } else if self.replay_ttl.as_secs() > 86_400 {
                errors.push("Replay TTL too long (maximum: 24h)".to_string());
            }

            if self.replay_max_entries == 0 {
                errors.push("Replay cache size must be greater than 0".to_string());
            } else if self.replay_max_entries > 10_000_000 {
                errors.push(format!(
                    "Replay cache size too large: {} (max recommended: 10,000,000)",
                    self.replay_max_entries
                ));
            }
        }

        if self.metrics_interval.as_secs() < 1 {
            errors.push("Metrics interval too short (minimum: 1s)".to_string());
        }

        errors
    }
}

/// Client-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Target server address
    pub address: String,

    /// Timeout for waiting for the reply datagram
    #[serde(with = "duration_serde")]
    pub response_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:4444"),
            response_timeout: timeout::DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Validate client configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Client address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid client address format: '{}' (expected format: '10.0.0.1:4444')",
                self.address
            ));
        }

        if self.response_timeout.as_millis() < 10 {
            errors.push("Response timeout too short (minimum: 10ms)".to_string());
        } else if self.response_timeout.as_secs() > 60 {
            errors.push("Response timeout too long (maximum: 60s)".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("gate-server"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// One controller known to the server
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeviceEntry {
    /// Hardware address, e.g. "aa:bb:cc:dd:ee:ff"
    pub id: String,

    /// 32-byte key as 64 hex digits
    pub key: String,
}

impl DeviceEntry {
    pub fn parse(&self) -> Result<(DeviceId, Key)> {
        let id = self.id.parse::<DeviceId>()?;
        let key = Key::from_hex(&self.key)?;
        Ok((id, key))
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
