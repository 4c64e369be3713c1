//! DNS Message Builder
//!
//! Re-serializes a client request for relaying upstream. The upstream query
//! gets its own random id so replies can be matched independently of the
//! client's id.

use crate::dns::codec::HickoryWireCodec;
use rivet_dns_domain::{DnsRequest, DomainError};

pub struct MessageBuilder;

impl MessageBuilder {
    /// Copy of `request` under a fresh random id, in wire format.
    ///
    /// Returns the id alongside the bytes for response matching.
    pub fn build_forward_query(request: &DnsRequest) -> Result<(u16, Vec<u8>), DomainError> {
        let id = fastrand::u16(..);
        let bytes = Self::build_forward_query_with_id(request, id)?;
        Ok((id, bytes))
    }

    pub fn build_forward_query_with_id(
        request: &DnsRequest,
        id: u16,
    ) -> Result<Vec<u8>, DomainError> {
        let mut message = request.message().clone();
        let mut header = *message.header();
        header.set_id(id);
        message.set_header(header);
        HickoryWireCodec::serialize_message(&message)
    }
}
