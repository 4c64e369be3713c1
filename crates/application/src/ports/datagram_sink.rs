use async_trait::async_trait;
use rivet_dns_domain::DomainError;
use std::net::SocketAddr;

/// Outbound half of the listening socket, shared by every in-flight request.
#[async_trait]
pub trait DatagramSink: Send + Sync {
    /// Returns [`DomainError::ResourceDisposed`] once the socket was released.
    async fn send_to(&self, payload: &[u8], remote: SocketAddr) -> Result<usize, DomainError>;
}
