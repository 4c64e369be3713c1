use rivet_dns_domain::config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init();
    } else {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init();
    }
}
