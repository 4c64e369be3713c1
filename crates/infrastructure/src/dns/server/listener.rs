use super::sink::UdpDatagramSink;
use super::socket::{create_udp_socket, is_per_datagram_error, DatagramSource, SocketHardening};
use rivet_dns_application::events::{ErroredEvent, ListeningEvent, ServerEventEmitter};
use rivet_dns_application::ports::DatagramSink;
use rivet_dns_application::services::ServerLifecycle;
use rivet_dns_application::use_cases::HandleDatagramUseCase;
use rivet_dns_domain::{DomainError, ServerState};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub const DEFAULT_DNS_PORT: u16 = 53;

/// UDP DNS server: one receive loop plus one spawned pipeline per datagram.
///
/// Built by [`super::DnsServerBuilder`]. `listen` runs until [`stop`] is
/// called or the socket fails, so callers usually share the server through an
/// `Arc` and drive `listen` from its own task.
///
/// [`stop`]: UdpDnsServer::stop
pub struct UdpDnsServer {
    handler: Arc<HandleDatagramUseCase>,
    hardening: Arc<dyn SocketHardening>,
    lifecycle: ServerLifecycle,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    local_addr: Mutex<Option<SocketAddr>>,
    recv_buffer_size: usize,
    in_flight: Option<Arc<Semaphore>>,
}

impl UdpDnsServer {
    pub(super) fn new(
        handler: Arc<HandleDatagramUseCase>,
        hardening: Arc<dyn SocketHardening>,
        recv_buffer_size: usize,
        max_in_flight: Option<usize>,
    ) -> Self {
        Self {
            handler,
            hardening,
            lifecycle: ServerLifecycle::new(),
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
            local_addr: Mutex::new(None),
            recv_buffer_size,
            in_flight: max_in_flight.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    pub async fn listen_default(&self) {
        self.listen_on(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_DNS_PORT)
            .await
    }

    pub async fn listen_on(&self, address: IpAddr, port: u16) {
        self.listen(SocketAddr::new(address, port)).await
    }

    /// Binds `endpoint` and serves until stopped.
    ///
    /// Returns immediately when the server was already started or stopped,
    /// or when the bind fails (after an errored notification).
    pub async fn listen(&self, endpoint: SocketAddr) {
        if !self.start(&endpoint) {
            return;
        }

        let socket = match create_udp_socket(endpoint, self.hardening.as_ref()) {
            Ok(socket) => Arc::new(socket),
            Err(e) => {
                error!(endpoint = %endpoint, error = %e, "Failed to bind DNS listener");
                self.abort_start(DomainError::Transport(format!(
                    "Failed to bind {}: {}",
                    endpoint, e
                )));
                return;
            }
        };

        let local_addr = socket.local_addr().unwrap_or(endpoint);
        let sink: Arc<dyn DatagramSink> = Arc::new(UdpDatagramSink::new(
            Arc::clone(&socket),
            self.shutdown.clone(),
        ));
        self.serve(socket, sink, local_addr).await;
    }

    /// Serves datagrams from an already-bound source, replying through
    /// `sink`. Same lifecycle and notifications as [`listen`], minus the bind.
    ///
    /// [`listen`]: UdpDnsServer::listen
    pub async fn listen_with(&self, source: Arc<dyn DatagramSource>, sink: Arc<dyn DatagramSink>) {
        let local_addr = match source.bound_addr() {
            Ok(addr) => addr,
            Err(e) => {
                if self.start(&"unbound datagram source") {
                    self.abort_start(DomainError::from(e));
                }
                return;
            }
        };

        if self.start(&local_addr) {
            self.serve(source, sink, local_addr).await;
        }
    }

    fn start(&self, endpoint: &dyn std::fmt::Display) -> bool {
        if self.lifecycle.try_start() {
            return true;
        }
        warn!(
            endpoint = %endpoint,
            state = %self.lifecycle.state(),
            "listen ignored: server is not in the created state"
        );
        false
    }

    fn abort_start(&self, error: DomainError) {
        self.handler
            .events()
            .emit_errored(&ErroredEvent::new(error, None));
        self.release();
    }

    fn release(&self) {
        self.set_local_addr(None);
        self.lifecycle.begin_stop();
        self.shutdown.cancel();
        self.tasks.close();
        self.lifecycle.finish_stop();
    }

    async fn serve(
        &self,
        source: Arc<dyn DatagramSource>,
        sink: Arc<dyn DatagramSink>,
        local_addr: SocketAddr,
    ) {
        self.set_local_addr(Some(local_addr));

        if !self.shutdown.is_cancelled() {
            info!(bind_address = %local_addr, "DNS server listening");
            self.handler
                .events()
                .emit_listening(&ListeningEvent { local_addr });
            self.receive_loop(source.as_ref(), &sink).await;
        }

        drop(source);
        self.release();
        info!(bind_address = %local_addr, "DNS server stopped");
    }

    async fn receive_loop(&self, source: &dyn DatagramSource, sink: &Arc<dyn DatagramSink>) {
        let mut recv_buf = vec![0u8; self.recv_buffer_size];

        loop {
            let (n, remote) = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!("Receive loop ended by shutdown");
                    break;
                }
                result = source.recv_datagram(&mut recv_buf) => match result {
                    Ok(received) => received,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) if self.lifecycle.is_shutting_down() => {
                        debug!(error = %e, "Receive failed during shutdown");
                        break;
                    }
                    Err(e) if is_per_datagram_error(&e) => {
                        warn!(error = %e, "Dropped one inbound datagram");
                        self.handler
                            .events()
                            .emit_errored(&ErroredEvent::new(DomainError::from(e), None));
                        continue;
                    }
                    Err(e) => {
                        error!(error = %e, "UDP receive failed, ending receive loop");
                        self.handler
                            .events()
                            .emit_errored(&ErroredEvent::new(DomainError::from(e), None));
                        break;
                    }
                },
            };

            let Some(permit) = self.acquire_slot().await else {
                break;
            };
            let raw: Arc<[u8]> = Arc::from(&recv_buf[..n]);
            self.spawn_pipeline(raw, remote, Arc::clone(sink), permit);
        }
    }

    /// Waits for an in-flight slot when the server is bounded. `None` means
    /// shutdown arrived first.
    async fn acquire_slot(&self) -> Option<Option<OwnedSemaphorePermit>> {
        let Some(semaphore) = &self.in_flight else {
            return Some(None);
        };

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            permit = Arc::clone(semaphore).acquire_owned() => permit.ok().map(Some),
        }
    }

    fn spawn_pipeline(
        &self,
        raw: Arc<[u8]>,
        remote: SocketAddr,
        sink: Arc<dyn DatagramSink>,
        permit: Option<OwnedSemaphorePermit>,
    ) {
        let handler = Arc::clone(&self.handler);
        self.tasks.spawn(async move {
            let outcome = handler.execute(raw, remote, sink.as_ref()).await;
            debug!(remote = %remote, outcome = ?outcome, "Datagram handled");
            drop(permit);
        });
    }

    /// Requests shutdown. Idempotent.
    ///
    /// A server that never started moves straight to `Stopped`. A listening
    /// server moves to `Stopping`; `listen` finishes the transition once the
    /// receive loop has ended.
    pub fn stop(&self) {
        match self.lifecycle.begin_stop() {
            Some(ServerState::Created) => {
                self.shutdown.cancel();
                self.tasks.close();
                self.lifecycle.finish_stop();
                debug!("DNS server stopped before start");
            }
            Some(_) => {
                info!("Stopping DNS server");
                self.shutdown.cancel();
                self.tasks.close();
            }
            None => {}
        }
    }

    /// Waits until every spawned pipeline has finished. Only meaningful after
    /// `stop` or once `listen` has returned.
    pub async fn drain(&self) {
        self.tasks.wait().await;
    }

    pub fn state(&self) -> ServerState {
        self.lifecycle.state()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.lock().ok().and_then(|addr| *addr)
    }

    pub fn events(&self) -> &Arc<ServerEventEmitter> {
        self.handler.events()
    }

    fn set_local_addr(&self, addr: Option<SocketAddr>) {
        if let Ok(mut slot) = self.local_addr.lock() {
            *slot = addr;
        }
    }
}

impl Drop for UdpDnsServer {
    fn drop(&mut self) {
        self.stop();
    }
}
