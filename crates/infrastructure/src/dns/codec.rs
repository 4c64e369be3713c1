//! DNS wire format (RFC 1035 §4.1) via `hickory-proto`.

use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use rivet_dns_application::ports::WireCodec;
use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};

/// Fixed DNS header length
pub const DNS_HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, Default)]
pub struct HickoryWireCodec;

impl HickoryWireCodec {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::Parse(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}

impl WireCodec for HickoryWireCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DnsRequest, DomainError> {
        if bytes.len() < DNS_HEADER_LEN {
            return Err(DomainError::Parse(format!(
                "datagram of {} bytes is shorter than the DNS header",
                bytes.len()
            )));
        }

        Message::from_vec(bytes)
            .map(DnsRequest::new)
            .map_err(|e| DomainError::Parse(format!("Failed to parse DNS message: {}", e)))
    }

    fn encode(&self, response: &DnsResponse) -> Result<Vec<u8>, DomainError> {
        Self::serialize_message(response.message())
    }

    fn default_response(&self, request: &DnsRequest) -> DnsResponse {
        let query = request.message();
        let mut message = Message::new(query.id(), MessageType::Response, query.op_code());
        message.set_recursion_desired(query.recursion_desired());
        message.set_recursion_available(true);
        message.set_response_code(ResponseCode::ServFail);
        for q in query.queries() {
            message.add_query(q.clone());
        }
        DnsResponse::new(message)
    }
}
