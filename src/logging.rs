use tracing_subscriber::EnvFilter;

/// Install the console subscriber. `RUST_LOG` wins when set; otherwise the
/// crate logs at `info`, or `debug` when `debug` is true.
pub fn init(debug: bool) {
    let level = if debug { "repaint=debug" } else { "repaint=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
