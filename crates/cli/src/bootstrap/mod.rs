mod logging;

pub use logging::init_logging;

use rivet_dns_domain::{CliOverrides, Config};

/// Loads, overrides and validates the configuration.
pub fn load_config(path: Option<&str>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}
