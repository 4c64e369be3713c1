use crate::events::{ErroredEvent, RequestedEvent, RespondedEvent, ServerEventEmitter};
use crate::ports::{DatagramSink, DnsResolver, WireCodec};
use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(2000);

/// How a single datagram ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatagramOutcome {
    /// Resolved and sent.
    Answered,
    /// Could not be decoded; nothing was sent.
    Malformed,
    /// Resolution failed; a fallback reply was attempted.
    FallbackSent,
    /// A transport, parse or timeout failure after decoding.
    Failed,
    /// The socket was released while the datagram was in flight.
    Abandoned,
}

/// Per-datagram pipeline: decode, resolve, encode, send.
///
/// Never fails. Every error is either reported on the errored channel or,
/// for a released socket, dropped silently.
pub struct HandleDatagramUseCase {
    codec: Arc<dyn WireCodec>,
    resolver: Arc<dyn DnsResolver>,
    events: Arc<ServerEventEmitter>,
    send_timeout: Duration,
}

impl HandleDatagramUseCase {
    pub fn new(
        codec: Arc<dyn WireCodec>,
        resolver: Arc<dyn DnsResolver>,
        events: Arc<ServerEventEmitter>,
    ) -> Self {
        Self {
            codec,
            resolver,
            events,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    pub fn events(&self) -> &Arc<ServerEventEmitter> {
        &self.events
    }

    pub async fn execute(
        &self,
        raw: Arc<[u8]>,
        remote: SocketAddr,
        sink: &dyn DatagramSink,
    ) -> DatagramOutcome {
        let request = match self.codec.decode(&raw) {
            Ok(request) => Arc::new(request),
            Err(e) => {
                debug!(remote = %remote, bytes = raw.len(), error = %e, "Dropping undecodable datagram");
                self.report(e, remote);
                return DatagramOutcome::Malformed;
            }
        };

        debug!(remote = %remote, id = request.id(), query = %request.summary(), "DNS query received");

        self.events.emit_requested(&RequestedEvent {
            request: Arc::clone(&request),
            raw: Arc::clone(&raw),
            remote,
        });

        match self.answer(&request, &raw, remote, sink).await {
            Ok(()) => DatagramOutcome::Answered,
            Err(e) if e.is_benign() => {
                debug!(remote = %remote, id = request.id(), "Socket released before reply");
                DatagramOutcome::Abandoned
            }
            Err(DomainError::ResolutionFailure { reason, response }) => {
                let fallback = match &response {
                    Some(response) => (**response).clone(),
                    None => self.codec.default_response(&request),
                };

                if let Err(e) = self.transmit(&fallback, remote, sink).await {
                    debug!(remote = %remote, error = %e, "Fallback reply not delivered");
                }

                warn!(remote = %remote, id = request.id(), reason = %reason, "Resolution failed");
                self.report(DomainError::ResolutionFailure { reason, response }, remote);
                DatagramOutcome::FallbackSent
            }
            Err(e) => {
                self.report(e, remote);
                DatagramOutcome::Failed
            }
        }
    }

    async fn answer(
        &self,
        request: &Arc<DnsRequest>,
        raw: &Arc<[u8]>,
        remote: SocketAddr,
        sink: &dyn DatagramSink,
    ) -> Result<(), DomainError> {
        let response = Arc::new(self.resolver.resolve(request).await?);

        self.events.emit_responded(&RespondedEvent {
            request: Arc::clone(request),
            response: Arc::clone(&response),
            raw: Arc::clone(raw),
            remote,
        });

        let sent = self.transmit(&response, remote, sink).await?;
        debug!(
            remote = %remote,
            id = response.id(),
            answers = response.answer_count(),
            bytes = sent,
            "Response sent"
        );
        Ok(())
    }

    async fn transmit(
        &self,
        response: &DnsResponse,
        remote: SocketAddr,
        sink: &dyn DatagramSink,
    ) -> Result<usize, DomainError> {
        let bytes = self.codec.encode(response)?;

        tokio::time::timeout(self.send_timeout, sink.send_to(&bytes, remote))
            .await
            .map_err(|_| {
                DomainError::Cancelled(format!(
                    "send to {} timed out after {} ms",
                    remote,
                    self.send_timeout.as_millis()
                ))
            })?
    }

    fn report(&self, error: DomainError, remote: SocketAddr) {
        self.events.emit_errored(&ErroredEvent::new(error, Some(remote)));
    }
}
