use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber, reading its filter directive
/// from `RUST_LOG` (defaulting to `info`). Must be called exactly once,
/// before any role runs.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
