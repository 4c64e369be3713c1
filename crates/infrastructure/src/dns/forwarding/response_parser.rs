use hickory_proto::op::{Message, MessageType};
use rivet_dns_domain::{DnsResponse, DomainError};
use tracing::debug;

pub struct ResponseParser;

impl ResponseParser {
    /// Parses an upstream reply and checks it answers the query sent with
    /// `expected_id`.
    pub fn parse(response_bytes: &[u8], expected_id: u16) -> Result<Message, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::Parse(format!("Failed to parse upstream response: {}", e))
        })?;

        if message.id() != expected_id {
            return Err(DomainError::Parse(format!(
                "Upstream response id {} does not match query id {}",
                message.id(),
                expected_id
            )));
        }

        if message.message_type() != MessageType::Response {
            return Err(DomainError::Parse(
                "Upstream reply is not a response".to_string(),
            ));
        }

        debug!(
            id = expected_id,
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            truncated = message.truncated(),
            "Upstream response parsed"
        );

        Ok(message)
    }

    /// Rewrites the reply id back to the one the client used.
    pub fn into_client_response(mut message: Message, client_id: u16) -> DnsResponse {
        let mut header = *message.header();
        header.set_id(client_id);
        message.set_header(header);
        DnsResponse::new(message)
    }
}
