use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use rivet_dns_application::events::ServerEventEmitter;
use rivet_dns_domain::DnsRequest;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;

pub fn encode_message(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(name).unwrap(), record_type));
    message
}

pub fn query_bytes(id: u16, name: &str) -> Vec<u8> {
    encode_message(&query_message(id, name, RecordType::A))
}

pub fn request(id: u16, name: &str, record_type: RecordType) -> DnsRequest {
    DnsRequest::new(query_message(id, name, record_type))
}

/// A bare 12-byte header: query, RD set, zero questions.
pub fn minimal_query_bytes(id: u16) -> Vec<u8> {
    let [hi, lo] = id.to_be_bytes();
    vec![hi, lo, 0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]
}

pub async fn client_socket() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.unwrap()
}

/// Sends `payload` and waits up to `wait` for one reply.
pub async fn exchange(
    client: &UdpSocket,
    payload: &[u8],
    server: SocketAddr,
    wait: Duration,
) -> Option<Message> {
    client.send_to(payload, server).await.unwrap();
    recv_reply(client, wait).await
}

pub async fn recv_reply(client: &UdpSocket, wait: Duration) -> Option<Message> {
    let mut buf = vec![0u8; 4096];
    match tokio::time::timeout(wait, client.recv_from(&mut buf)).await {
        Ok(Ok((n, _))) => Some(Message::from_vec(&buf[..n]).unwrap()),
        _ => None,
    }
}

/// Polls `check` until it holds or two seconds pass.
pub async fn wait_until<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Collects every notification as a short label, in emission order.
#[derive(Clone, Default)]
pub struct EventRecorder {
    log: Arc<Mutex<Vec<String>>>,
    listening_on: Arc<Mutex<Option<SocketAddr>>>,
}

impl EventRecorder {
    pub fn attach(events: &ServerEventEmitter) -> Self {
        let recorder = Self::default();

        let (log, addr) = (recorder.log.clone(), recorder.listening_on.clone());
        events.on_listening(move |e| {
            *addr.lock().unwrap() = Some(e.local_addr);
            log.lock().unwrap().push("listening".to_string());
        });
        let log = recorder.log.clone();
        events.on_requested(move |e| {
            log.lock()
                .unwrap()
                .push(format!("requested:{}", e.request.id()));
        });
        let log = recorder.log.clone();
        events.on_responded(move |e| {
            log.lock()
                .unwrap()
                .push(format!("responded:{}", e.response.id()));
        });
        let log = recorder.log.clone();
        events.on_errored(move |e| {
            log.lock()
                .unwrap()
                .push(format!("errored:{}", e.error.kind()));
        });

        recorder
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.log().iter().filter(|l| l.starts_with(prefix)).count()
    }

    pub fn listening_on(&self) -> Option<SocketAddr> {
        *self.listening_on.lock().unwrap()
    }
}
