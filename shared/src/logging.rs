use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NONE)
        .with_test_writer()
        .try_init();
}

/// Installs a stderr subscriber for command-line use.
///
/// `filter` uses the `EnvFilter` directive syntax (`info`, `batch=debug`, ...).
/// An unparsable directive falls back to `info`.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
