use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};

/// DNS wire format, both directions.
pub trait WireCodec: Send + Sync {
    /// Fails with [`DomainError::Parse`] on malformed or truncated input.
    fn decode(&self, bytes: &[u8]) -> Result<DnsRequest, DomainError>;

    fn encode(&self, response: &DnsResponse) -> Result<Vec<u8>, DomainError>;

    /// Minimal reply echoing the identity of `request`, used when a failure
    /// leaves nothing better to send.
    fn default_response(&self, request: &DnsRequest) -> DnsResponse;
}
