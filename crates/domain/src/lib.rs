//! Rivet DNS Domain Layer
pub mod config;
pub mod dns_message;
pub mod errors;
pub mod server_state;

pub use config::{CliOverrides, Config, ConfigError};
pub use dns_message::{DnsRequest, DnsResponse};
pub use errors::DomainError;
pub use server_state::ServerState;
