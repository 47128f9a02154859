use getdns_domain::Config;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout carries only the JSON result.
///
/// `RUST_LOG` wins over the configured level, e.g. `RUST_LOG=getdns_infrastructure=debug`.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .ok();
}
