//! Tracing subscriber setup shared by the desktop binary and headless hosts.

use tracing_subscriber::EnvFilter;

/// Installs a compact stdout subscriber.
///
/// `RUST_LOG` wins over `default_directive`. Calling this more than once is harmless,
/// later calls are ignored.
pub fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .compact()
        .try_init();
}
