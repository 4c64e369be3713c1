use rivet_dns_application::events::ServerEventEmitter;
use rivet_dns_infrastructure::dns::UdpDnsServer;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Logs every server notification.
pub fn attach_event_logging(events: &ServerEventEmitter) {
    events.on_listening(|e| {
        info!(local_addr = %e.local_addr, "DNS server ready");
    });
    events.on_requested(|e| {
        debug!(remote = %e.remote, id = e.request.id(), query = %e.request.summary(), "Query");
    });
    events.on_responded(|e| {
        debug!(
            remote = %e.remote,
            id = e.response.id(),
            rcode = %e.response.response_code(),
            answers = e.response.answer_count(),
            "Answer"
        );
    });
    events.on_errored(|e| match e.remote {
        Some(remote) => warn!(remote = %remote, kind = e.error.kind(), error = %e.error, "Query failed"),
        None => error!(kind = e.error.kind(), error = %e.error, "Server error"),
    });
}

/// Serves on `endpoint` until Ctrl-C or until the listener gives up.
pub async fn run_until_shutdown(server: Arc<UdpDnsServer>, endpoint: SocketAddr) {
    let mut listener = tokio::spawn({
        let server = Arc::clone(&server);
        async move { server.listen(endpoint).await }
    });

    tokio::select! {
        _ = &mut listener => {
            warn!("DNS listener ended on its own");
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown requested");
            server.stop();
            if let Err(e) = listener.await {
                error!(error = %e, "DNS listener task failed");
            }
        }
    }

    server.stop();
    server.drain().await;
}
