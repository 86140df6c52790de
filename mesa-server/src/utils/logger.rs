//! Logging Infrastructure
//!
//! `tracing-subscriber` with an `EnvFilter` (`RUST_LOG` wins over the
//! configured level) and an optional daily rolling file.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger on stdout
pub fn init_logger(log_level: &str) {
    init_logger_with_file(log_level, None);
}

/// Initialize the logger with optional file output
///
/// When `log_dir` exists, logs go to `<log_dir>/mesa-server.YYYY-MM-DD`.
pub fn init_logger_with_file(log_level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("mesa_server={log_level},tower_http={log_level},sqlx=warn").into()
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "mesa-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}
