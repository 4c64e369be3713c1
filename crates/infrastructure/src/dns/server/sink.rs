use async_trait::async_trait;
use rivet_dns_application::ports::DatagramSink;
use rivet_dns_domain::DomainError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

/// Sends replies through the listening socket.
///
/// Once the server's shutdown token fires the socket counts as released and
/// every send fails with [`DomainError::ResourceDisposed`].
#[derive(Clone)]
pub struct UdpDatagramSink {
    socket: Arc<UdpSocket>,
    shutdown: CancellationToken,
}

impl UdpDatagramSink {
    pub fn new(socket: Arc<UdpSocket>, shutdown: CancellationToken) -> Self {
        Self { socket, shutdown }
    }
}

#[async_trait]
impl DatagramSink for UdpDatagramSink {
    async fn send_to(&self, payload: &[u8], remote: SocketAddr) -> Result<usize, DomainError> {
        if self.shutdown.is_cancelled() {
            return Err(DomainError::ResourceDisposed);
        }

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(DomainError::ResourceDisposed),
            sent = self.socket.send_to(payload, remote) => sent.map_err(|e| {
                DomainError::Transport(format!("Failed to send reply to {}: {}", remote, e))
            }),
        }
    }
}
