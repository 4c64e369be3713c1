use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use crate::dns::transport::{DnsTransport, UdpTransport};
use async_trait::async_trait;
use rivet_dns_application::ports::DnsResolver;
use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_millis(5000);

/// Relays requests to a single upstream server.
///
/// Any upstream problem surfaces as a resolution failure without a response,
/// so the client receives the default SERVFAIL reply.
pub struct ForwardingResolver {
    transport: Arc<dyn DnsTransport>,
    timeout: Duration,
}

impl ForwardingResolver {
    pub fn new(upstream: SocketAddr) -> Self {
        Self::with_transport(Arc::new(UdpTransport::new(upstream)))
    }

    pub fn with_transport(transport: Arc<dyn DnsTransport>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn upstream(&self) -> SocketAddr {
        self.transport.server_addr()
    }

    async fn exchange(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        let (upstream_id, bytes) = MessageBuilder::build_forward_query(request)?;
        let reply = self.transport.send(&bytes, self.timeout).await?;
        let message = ResponseParser::parse(&reply.bytes, upstream_id)?;
        Ok(ResponseParser::into_client_response(message, request.id()))
    }
}

#[async_trait]
impl DnsResolver for ForwardingResolver {
    async fn resolve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        let upstream = self.upstream();

        match self.exchange(request).await {
            Ok(response) => {
                debug!(
                    upstream = %upstream,
                    protocol = self.transport.protocol_name(),
                    query = %request.summary(),
                    answers = response.answer_count(),
                    "Forwarded query answered"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(upstream = %upstream, query = %request.summary(), error = %e, "Upstream query failed");
                Err(DomainError::resolution_failure(format!(
                    "upstream {}: {}",
                    upstream, e
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "forward"
    }
}
