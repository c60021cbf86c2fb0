use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Environment variable holding the log filter, e.g. `BUCKETQ_LOG=bucketq=debug`.
pub const LOG_ENV: &str = "BUCKETQ_LOG";

const DEFAULT_FILTER: &str = "bucketq=warn";

/// Installs a stderr logger so diagnostics never interleave with query
/// output on stdout. Does nothing if a global subscriber is already set.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    let _ = Registry::default().with(env_filter).with(fmt_layer).try_init();
}
