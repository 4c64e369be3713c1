use async_trait::async_trait;
use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
use std::sync::Arc;

/// Turns a request into a response, or fails.
///
/// A resolver that cannot answer but still wants a specific reply on the wire
/// returns [`DomainError::ResolutionFailure`] carrying that response.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError>;

    /// Short label for log lines.
    fn name(&self) -> &str {
        "resolver"
    }
}

#[async_trait]
impl<R: DnsResolver + ?Sized> DnsResolver for Arc<R> {
    async fn resolve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        (**self).resolve(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
