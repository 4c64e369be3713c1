use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Upper bound on a single reply transmission
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    #[serde(default = "default_recv_buffer_size")]
    pub recv_buffer_size: usize,

    /// Maximum number of datagrams processed concurrently. Unbounded when unset.
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

impl ServerConfig {
    pub fn bind_ip(&self) -> Option<IpAddr> {
        self.bind_address.parse().ok()
    }

    pub fn endpoint(&self) -> Option<SocketAddr> {
        self.bind_ip().map(|ip| SocketAddr::new(ip, self.dns_port))
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            send_timeout_ms: default_send_timeout_ms(),
            recv_buffer_size: default_recv_buffer_size(),
            max_in_flight: None,
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_dns_port() -> u16 {
    53
}

fn default_send_timeout_ms() -> u64 {
    2000
}

fn default_recv_buffer_size() -> usize {
    4096
}
