use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

use super::wire::encode_message;

#[derive(Debug, Clone, Copy)]
pub enum UpstreamMode {
    /// Answer every question with one A record.
    Answer(Ipv4Addr),
    /// Answer with NOERROR and no records.
    Empty,
    /// Swallow queries.
    Silent,
}

/// Single-socket upstream DNS server on 127.0.0.1.
pub struct MockUpstream {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn start(mode: UpstreamMode) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(reply) = Self::build_reply(&buf[..len], mode) {
                                let _ = socket.send_to(&reply, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn build_reply(query: &[u8], mode: UpstreamMode) -> Option<Vec<u8>> {
        let query = Message::from_vec(query).ok()?;

        let mut reply = Message::new(query.id(), MessageType::Response, query.op_code());
        reply.set_recursion_desired(query.recursion_desired());
        reply.set_recursion_available(true);
        for question in query.queries() {
            reply.add_query(question.clone());
        }

        match mode {
            UpstreamMode::Silent => return None,
            UpstreamMode::Empty => {}
            UpstreamMode::Answer(ip) => {
                for question in query.queries() {
                    reply.add_answer(Record::from_rdata(
                        question.name().clone(),
                        60,
                        RData::A(A(ip)),
                    ));
                }
            }
        }

        Some(encode_message(&reply))
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
