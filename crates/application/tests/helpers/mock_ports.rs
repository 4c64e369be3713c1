use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use rivet_dns_application::events::ServerEventEmitter;
use rivet_dns_application::ports::{DatagramSink, DnsResolver, WireCodec};
use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CLIENT: &str = "192.0.2.10:40000";

pub fn client_addr() -> SocketAddr {
    CLIENT.parse().unwrap()
}

// ── wire helpers ────────────────────────────────────────────────────────────

pub fn encode_message(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

/// Query for `name` A with the given id.
pub fn query_bytes(id: u16, name: &str) -> Vec<u8> {
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(name).unwrap(), RecordType::A));
    encode_message(&message)
}

/// A bare 12-byte header: query, RD set, zero questions.
pub fn minimal_query_bytes(id: u16) -> Vec<u8> {
    let [hi, lo] = id.to_be_bytes();
    vec![hi, lo, 0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]
}

pub fn response_with_answers(id: u16, answers: usize) -> DnsResponse {
    let mut message = Message::new(id, MessageType::Response, OpCode::Query);
    for i in 0..answers {
        message.add_answer(Record::from_rdata(
            Name::from_str("example.com.").unwrap(),
            60,
            RData::A(A(Ipv4Addr::new(192, 0, 2, (i + 1) as u8))),
        ));
    }
    DnsResponse::new(message)
}

pub fn decode_reply(bytes: &[u8]) -> Message {
    Message::from_vec(bytes).unwrap()
}

// ── codec ──────────────────────────────────────────────────────────────────

/// hickory-backed codec mirroring the production one.
pub struct TestCodec;

impl WireCodec for TestCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DnsRequest, DomainError> {
        if bytes.len() < 12 {
            return Err(DomainError::Parse(format!("{} bytes", bytes.len())));
        }
        Message::from_vec(bytes)
            .map(DnsRequest::new)
            .map_err(|e| DomainError::Parse(e.to_string()))
    }

    fn encode(&self, response: &DnsResponse) -> Result<Vec<u8>, DomainError> {
        Ok(encode_message(response.message()))
    }

    fn default_response(&self, request: &DnsRequest) -> DnsResponse {
        let mut message = Message::new(request.id(), MessageType::Response, OpCode::Query);
        message.set_response_code(ResponseCode::ServFail);
        for query in request.queries() {
            message.add_query(query.clone());
        }
        DnsResponse::new(message)
    }
}

// ── resolver ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum Behavior {
    /// Answer with this many A records.
    Answers(usize),
    Fail(DomainError),
}

pub struct MockDnsResolver {
    label: String,
    behavior: Behavior,
    response_id: Option<u16>,
    delay: Option<Duration>,
    delays_by_id: HashMap<u16, Duration>,
    calls: AtomicUsize,
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockDnsResolver {
    pub fn new(label: &str, behavior: Behavior) -> Self {
        Self {
            label: label.to_string(),
            behavior,
            response_id: None,
            delay: None,
            delays_by_id: HashMap::new(),
            calls: AtomicUsize::new(0),
            journal: None,
        }
    }

    pub fn empty(label: &str) -> Self {
        Self::new(label, Behavior::Answers(0))
    }

    pub fn answering(label: &str, answers: usize) -> Self {
        Self::new(label, Behavior::Answers(answers))
    }

    pub fn failing(label: &str, error: DomainError) -> Self {
        Self::new(label, Behavior::Fail(error))
    }

    /// Stamp every response with this id so tests can tell resolvers apart.
    pub fn with_response_id(mut self, id: u16) -> Self {
        self.response_id = Some(id);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_delay_for(mut self, request_id: u16, delay: Duration) -> Self {
        self.delays_by_id.insert(request_id, delay);
        self
    }

    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, entry: &str) {
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", entry, self.label));
        }
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.record("start");

        let delay = self.delays_by_id.get(&request.id()).copied().or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.record("end");

        match &self.behavior {
            Behavior::Answers(n) => Ok(response_with_answers(
                self.response_id.unwrap_or(request.id()),
                *n,
            )),
            Behavior::Fail(e) => Err(e.clone()),
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

// ── sink ───────────────────────────────────────────────────────────────────

pub enum SinkMode {
    Deliver,
    Stall(Duration),
    Fail(DomainError),
}

pub struct RecordingSink {
    mode: SinkMode,
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::with_mode(SinkMode::Deliver)
    }

    pub fn with_mode(mode: SinkMode) -> Self {
        Self {
            mode,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatagramSink for RecordingSink {
    async fn send_to(&self, payload: &[u8], remote: SocketAddr) -> Result<usize, DomainError> {
        match &self.mode {
            SinkMode::Deliver => {}
            SinkMode::Stall(duration) => tokio::time::sleep(*duration).await,
            SinkMode::Fail(e) => return Err(e.clone()),
        }
        self.sent.lock().unwrap().push((payload.to_vec(), remote));
        Ok(payload.len())
    }
}

// ── events ─────────────────────────────────────────────────────────────────

/// Records every notification as a short string, in delivery order.
#[derive(Clone, Default)]
pub struct EventRecorder {
    entries: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<(DomainError, Option<SocketAddr>)>>>,
}

impl EventRecorder {
    pub fn attach(events: &ServerEventEmitter) -> Self {
        let recorder = Self::default();

        let r = recorder.clone();
        events.on_listening(move |_| r.push("listening".to_string()));
        let r = recorder.clone();
        events.on_requested(move |e| r.push(format!("requested:{}", e.request.id())));
        let r = recorder.clone();
        events.on_responded(move |e| r.push(format!("responded:{}", e.request.id())));
        let r = recorder.clone();
        events.on_errored(move |e| {
            r.push(format!("errored:{}", e.error.kind()));
            r.errors.lock().unwrap().push((e.error.clone(), e.remote));
        });

        recorder
    }

    fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(DomainError, Option<SocketAddr>)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}
