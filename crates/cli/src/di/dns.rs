use rivet_dns_application::ports::DnsResolver;
use rivet_dns_application::use_cases::FallbackResolver;
use rivet_dns_domain::{Config, ConfigError};
use rivet_dns_infrastructure::dns::{
    DnsServerBuilder, ForwardingResolver, MasterResolver, UdpDnsServer,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub server: UdpDnsServer,
    pub endpoint: SocketAddr,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let resolver = Self::build_resolver(config)?;

        let endpoint = config.server.endpoint().ok_or_else(|| {
            ConfigError::Validation(format!(
                "Invalid bind address: {}",
                config.server.bind_address
            ))
        })?;

        let server = DnsServerBuilder::new(resolver)
            .from_server_config(&config.server)
            .build();

        Ok(Self { server, endpoint })
    }

    /// Local zone first; the upstream, when configured, only sees names the
    /// zone has no answer for.
    fn build_resolver(config: &Config) -> Result<Arc<dyn DnsResolver>, ConfigError> {
        let master: Arc<dyn DnsResolver> = Arc::new(MasterResolver::from_config(&config.zone)?);

        let Some(upstream) = config.upstream.server_addr() else {
            info!("No upstream configured, answering from the local zone only");
            return Ok(master);
        };

        let upstream = upstream.map_err(|e| {
            ConfigError::Validation(format!("Invalid upstream server: {}", e))
        })?;
        info!(upstream = %upstream, timeout_ms = config.upstream.timeout_ms, "Forwarding enabled");

        let forward: Arc<dyn DnsResolver> =
            Arc::new(ForwardingResolver::new(upstream).with_timeout(config.upstream.timeout()));
        Ok(Arc::new(FallbackResolver::new(master).then(forward)))
    }
}
