//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level. With a log directory the
//! output goes to a daily rolling file instead of stdout.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger (stdout, `info`)
pub fn init_logger() {
    let _ = init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON formatting and file output.
///
/// The returned guard must be kept alive for the file writer to flush.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: bool,
    log_dir: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let appender = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Cannot create log dir {}: {e}, logging to stdout", dir.display());
            return None;
        }
        Some(tracing_appender::rolling::daily(dir, "order-server.log"))
    });

    // try_init: tests and embedders may have installed a subscriber already
    match (appender, json) {
        (Some(file), true) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = builder.json().with_ansi(false).with_writer(writer).try_init();
            Some(guard)
        }
        (Some(file), false) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
            Some(guard)
        }
        (None, true) => {
            let _ = builder.json().try_init();
            None
        }
        (None, false) => {
            let _ = builder.try_init();
            None
        }
    }
}
