use super::listener::UdpDnsServer;
use super::socket::{PlatformHardening, SocketHardening};
use crate::dns::codec::HickoryWireCodec;
use crate::dns::resolver::ForwardingResolver;
use rivet_dns_application::events::ServerEventEmitter;
use rivet_dns_application::ports::{DnsResolver, WireCodec};
use rivet_dns_application::use_cases::dns::handle_datagram::DEFAULT_SEND_TIMEOUT;
use rivet_dns_application::use_cases::{FallbackResolver, HandleDatagramUseCase};
use rivet_dns_domain::config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RECV_BUFFER_SIZE: usize = 4096;

pub struct DnsServerBuilder {
    resolver: Arc<dyn DnsResolver>,
    codec: Arc<dyn WireCodec>,
    events: Arc<ServerEventEmitter>,
    hardening: Arc<dyn SocketHardening>,
    send_timeout: Duration,
    recv_buffer_size: usize,
    max_in_flight: Option<usize>,
}

impl DnsServerBuilder {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self {
            resolver,
            codec: Arc::new(HickoryWireCodec::new()),
            events: Arc::new(ServerEventEmitter::new()),
            hardening: Arc::new(PlatformHardening),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            max_in_flight: None,
        }
    }

    /// Answers from `master` first and forwards to `upstream` only when the
    /// master has no answer records.
    pub fn master_with_forward(master: Arc<dyn DnsResolver>, upstream: SocketAddr) -> Self {
        let forward: Arc<dyn DnsResolver> = Arc::new(ForwardingResolver::new(upstream));
        Self::new(Arc::new(FallbackResolver::new(master).then(forward)))
    }

    pub fn with_codec(mut self, codec: Arc<dyn WireCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Shares an existing event hub, e.g. one subscribed to before the
    /// server is built.
    pub fn with_events(mut self, events: Arc<ServerEventEmitter>) -> Self {
        self.events = events;
        self
    }

    pub fn with_hardening(mut self, hardening: Arc<dyn SocketHardening>) -> Self {
        self.hardening = hardening;
        self
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Datagrams longer than this are truncated on receive. Configuration
    /// validation keeps it at 512 bytes or more.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn from_server_config(self, config: &ServerConfig) -> Self {
        self.with_send_timeout(config.send_timeout())
            .with_recv_buffer_size(config.recv_buffer_size)
            .with_max_in_flight(config.max_in_flight)
    }

    pub fn events(&self) -> &Arc<ServerEventEmitter> {
        &self.events
    }

    pub fn build(self) -> UdpDnsServer {
        let handler = HandleDatagramUseCase::new(self.codec, self.resolver, self.events)
            .with_send_timeout(self.send_timeout);
        UdpDnsServer::new(
            Arc::new(handler),
            self.hardening,
            self.recv_buffer_size,
            self.max_in_flight,
        )
    }
}
