use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file path. When unset, logs go to stderr.
pub const LOG_FILE_ENV: &str = "EXPENSE_FLOW_LOG";

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Output goes to
/// the file named by `EXPENSE_FLOW_LOG` when set, otherwise to stderr so it
/// never mixes with command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        match std::fs::File::create(&path) {
            Ok(file) => {
                let file_layer = fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(UtcTime::rfc_3339());
                tracing_subscriber::registry()
                    .with(filter)
                    .with(file_layer)
                    .init();
                return;
            }
            Err(e) => eprintln!("Warning: Failed to create log file {}: {}", path, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339())
        .init();
}
