//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_FILE_NAME: &str = "startpage.log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/start-page/logs/`, never to stdout or
/// stderr: those streams carry the host protocol and view snapshots.
/// Log level is controlled by the `STARTPAGE_LOG` environment variable.
///
/// # Examples
/// ```bash
/// STARTPAGE_LOG=debug startpage
/// STARTPAGE_LOG=startpage_channel=trace startpage
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    // Default to info, allow override via STARTPAGE_LOG
    let env_filter = EnvFilter::try_from_env("STARTPAGE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("start_page=info,startpage_app=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Start page view starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("start-page").join("logs"))
}
