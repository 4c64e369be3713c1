use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
use std::net::SocketAddr;
use std::sync::Arc;

/// The receive loop has started.
#[derive(Debug, Clone)]
pub struct ListeningEvent {
    pub local_addr: SocketAddr,
}

/// A datagram decoded into a request.
#[derive(Debug, Clone)]
pub struct RequestedEvent {
    pub request: Arc<DnsRequest>,
    pub raw: Arc<[u8]>,
    pub remote: SocketAddr,
}

/// The resolver produced a response for a request.
#[derive(Debug, Clone)]
pub struct RespondedEvent {
    pub request: Arc<DnsRequest>,
    pub response: Arc<DnsResponse>,
    pub raw: Arc<[u8]>,
    pub remote: SocketAddr,
}

/// A contained failure.
#[derive(Debug, Clone)]
pub struct ErroredEvent {
    pub error: DomainError,
    /// Client whose datagram triggered the failure, when there was one.
    pub remote: Option<SocketAddr>,
}

impl ErroredEvent {
    pub fn new(error: DomainError, remote: Option<SocketAddr>) -> Self {
        Self { error, remote }
    }
}
