use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Maps the level names accepted on the command line to tracing levels. 'warning' and 'critical'
///  are accepted for compatibility with existing scripts.
fn tracing_level(level: &str) -> Option<&'static str> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

/// Installs the global tracing subscriber for a command line run. Log output goes to stderr, or to
///  `log_file` if given, so that stdout stays reserved for results. `RUST_LOG` overrides the level.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let known_level = tracing_level(level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(known_level.unwrap_or("info")));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    if known_level.is_none() {
        warn!("Unrecognized log level: {}  Log level set to info", level);
    }
    Ok(())
}
