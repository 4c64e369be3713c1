mod datagram_sink;
mod dns_resolver;
mod wire_codec;

pub use datagram_sink::DatagramSink;
pub use dns_resolver::DnsResolver;
pub use wire_codec::WireCodec;

// Re-export for convenience
pub use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
