use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Upstream server used when the local zone has no answer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// `ip:port` of the forwarding target. Forwarding is disabled when unset.
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn server_addr(&self) -> Option<Result<SocketAddr, std::net::AddrParseError>> {
        self.server.as_deref().map(str::parse)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            server: None,
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

fn default_upstream_timeout_ms() -> u64 {
    5000
}
