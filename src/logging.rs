//! Process-wide `tracing` subscriber setup.
//!
//! Output goes to stderr unless `SAFERDB_TRACE_FILE` names a file to append
//! to. `RUST_LOG` takes precedence over the configured level, and
//! `SAFERDB_TRACE_JSON` over the configured format.

use crate::config::LoggingConfig;
use std::env;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init(logging_config: &LoggingConfig) {
    let filter = env::var("RUST_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_new(&logging_config.level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let json = env::var("SAFERDB_TRACE_JSON")
        .ok()
        .map_or_else(|| logging_config.format == "json", |v| v != "0");

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> =
        match env::var("SAFERDB_TRACE_FILE") {
            Ok(log_path) => {
                let file = match std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_path)
                {
                    Ok(f) => f,
                    Err(e) => {
                        eprintln!("ERROR: Unable to open SAFERDB_TRACE_FILE '{log_path}': {e}");
                        return;
                    }
                };
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                if TRACE_GUARD.set(guard).is_err() {
                    return;
                }
                let base = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_writer(non_blocking);
                if json {
                    Box::new(base.json().finish())
                } else {
                    Box::new(base.compact().finish())
                }
            }
            Err(_) => {
                let base = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr);
                if json {
                    Box::new(base.json().finish())
                } else {
                    Box::new(base.compact().finish())
                }
            }
        };

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggingConfig::default();
        init(&config);
        init(&config);
        tracing::info!("logging_initialized");
    }
}
