use clap::Parser;
use rivet_dns_domain::CliOverrides;
use std::sync::Arc;
use tracing::info;

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "rivet-dns")]
#[command(version = "0.1.0")]
#[command(about = "Rivet DNS - UDP DNS server with a local zone and upstream forwarding")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream server for names outside the local zone (e.g. 1.1.1.1:53)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind,
        upstream: cli.upstream,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    // Initialize logging
    bootstrap::init_logging(&config.logging);

    info!("Starting Rivet DNS Server v{}", env!("CARGO_PKG_VERSION"));

    // Dependency Injection - Build the resolver chain and the server
    let dns = di::DnsServices::new(&config)?;
    server::attach_event_logging(dns.server.events());

    let endpoint = dns.endpoint;
    let server = Arc::new(dns.server);

    server::run_until_shutdown(server, endpoint).await;

    info!("Server shutdown complete");
    Ok(())
}
