use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::errors::ConfigError;
use super::local_records::ZoneConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

const LOCAL_CONFIG_PATH: &str = "rivet-dns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/rivet-dns/config.toml";

/// Classic DNS-over-UDP payload limit (RFC 1035 §4.2.1).
pub const MIN_RECV_BUFFER_SIZE: usize = 512;

/// Main configuration structure for Rivet DNS
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, port, send timeout)
    #[serde(default)]
    pub server: ServerConfig,

    /// Forwarding target
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Authoritative records
    #[serde(default)]
    pub zone: ZoneConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. rivet-dns.toml in current directory
    /// 3. /etc/rivet-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.server = Some(upstream);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.server.bind_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid bind address: {}",
                self.server.bind_address
            )));
        }

        if self.server.send_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Send timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.recv_buffer_size < MIN_RECV_BUFFER_SIZE {
            return Err(ConfigError::Validation(format!(
                "recv_buffer_size must be at least {} bytes, got {}",
                MIN_RECV_BUFFER_SIZE, self.server.recv_buffer_size
            )));
        }

        if self.server.max_in_flight == Some(0) {
            return Err(ConfigError::Validation(
                "max_in_flight must be greater than 0 when set".to_string(),
            ));
        }

        if let Some(Err(e)) = self.upstream.server_addr() {
            return Err(ConfigError::Validation(format!(
                "Invalid upstream server '{}': {}",
                self.upstream.server.as_deref().unwrap_or_default(),
                e
            )));
        }

        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|p| std::path::Path::new(p).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
    pub log_level: Option<String>,
}
