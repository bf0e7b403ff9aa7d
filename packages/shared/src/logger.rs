//! Logging setup shared by the notecollab binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the server library, the client library and the binary itself.
/// `RUST_LOG` overrides the default when set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "notecollab-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use notecollab_shared::logger::setup_logger;
///
/// setup_logger("notecollab-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    [
        "notecollab_server",
        "notecollab_client",
        "tower_http",
        &binary_name.replace('-', "_"),
    ]
    .iter()
    .map(|target| format!("{}={}", target, default_log_level))
    .collect::<Vec<_>>()
    .join(",")
}
