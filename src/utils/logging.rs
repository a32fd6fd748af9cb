use tracing_subscriber::EnvFilter;

/// Environment variable holding a full tracing filter directive
pub(crate) const LOG_ENV: &str = "WBAM_LOG";

fn default_directive(debug: bool) -> &'static str {
    if debug { "wbam=debug" } else { "warn" }
}

/// Install the stderr subscriber. `WBAM_LOG` wins over `debug` when set.
///
/// Safe to call more than once; later calls are ignored.
pub(crate) fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
