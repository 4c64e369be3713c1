use async_trait::async_trait;
use rivet_dns_application::ports::DatagramSink;
use rivet_dns_domain::DomainError;
use rivet_dns_infrastructure::dns::server::DatagramSource;
use rivet_dns_infrastructure::dns::UdpDnsServer;
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Weak};

pub enum RecvStep {
    Datagram(Vec<u8>, SocketAddr),
    Fail(io::ErrorKind),
    /// Calls `stop()` on the attached server, then fails.
    StopThenFail(io::ErrorKind),
}

/// Datagram source that replays a fixed script, then waits forever.
pub struct ScriptedSource {
    local_addr: SocketAddr,
    steps: Mutex<VecDeque<RecvStep>>,
    server: Mutex<Option<Weak<UdpDnsServer>>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<RecvStep>) -> Arc<Self> {
        Arc::new(Self {
            local_addr: "127.0.0.1:5300".parse().unwrap(),
            steps: Mutex::new(steps.into()),
            server: Mutex::new(None),
        })
    }

    pub fn attach(&self, server: &Arc<UdpDnsServer>) {
        *self.server.lock().unwrap() = Some(Arc::downgrade(server));
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().unwrap().len()
    }
}

#[async_trait]
impl DatagramSource for ScriptedSource {
    async fn recv_datagram(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(RecvStep::Datagram(bytes, remote)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok((n, remote))
            }
            Some(RecvStep::Fail(kind)) => Err(io::Error::from(kind)),
            Some(RecvStep::StopThenFail(kind)) => {
                let server = self.server.lock().unwrap().as_ref().and_then(Weak::upgrade);
                if let Some(server) = server {
                    server.stop();
                }
                Err(io::Error::from(kind))
            }
            None => std::future::pending().await,
        }
    }

    fn bound_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local_addr)
    }
}

/// Sink that keeps every reply.
#[derive(Default)]
pub struct CollectingSink {
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
}

impl CollectingSink {
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatagramSink for CollectingSink {
    async fn send_to(&self, payload: &[u8], remote: SocketAddr) -> Result<usize, DomainError> {
        self.sent.lock().unwrap().push((payload.to_vec(), remote));
        Ok(payload.len())
    }
}
