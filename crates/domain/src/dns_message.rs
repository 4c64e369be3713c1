use hickory_proto::op::{Message, Query, ResponseCode};
use hickory_proto::rr::Record;

/// A decoded DNS query. Read-only once built by the wire codec.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    message: Message,
}

impl DnsRequest {
    pub fn new(message: Message) -> Self {
        Self { message }
    }

    pub fn id(&self) -> u16 {
        self.message.id()
    }

    pub fn queries(&self) -> &[Query] {
        self.message.queries()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// First question rendered as `name TYPE`, for log lines.
    pub fn summary(&self) -> String {
        match self.message.queries().first() {
            Some(query) => format!("{} {}", query.name(), query.query_type()),
            None => "<no question>".to_string(),
        }
    }
}

/// An answer produced by a resolver, or synthesized by the wire codec.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    message: Message,
}

impl DnsResponse {
    pub fn new(message: Message) -> Self {
        Self { message }
    }

    pub fn id(&self) -> u16 {
        self.message.id()
    }

    pub fn answers(&self) -> &[Record] {
        self.message.answers()
    }

    pub fn answer_count(&self) -> usize {
        self.message.answers().len()
    }

    pub fn has_answers(&self) -> bool {
        !self.message.answers().is_empty()
    }

    pub fn response_code(&self) -> ResponseCode {
        self.message.response_code()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }
}

impl From<Message> for DnsResponse {
    fn from(message: Message) -> Self {
        Self::new(message)
    }
}
