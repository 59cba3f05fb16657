use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::AppError;

/// Overrides `[log] level` when set.
pub const LOG_ENV: &str = "PAPERATE_LOG";

/// Install the global subscriber writing to `file`. The terminal belongs to
/// the TUI, so nothing goes to stdout or stderr. Keep the returned guard
/// alive until exit or buffered lines are lost.
pub fn init(level: &str, file: &Path) -> Result<WorkerGuard, AppError> {
    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let name = file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "paperate.log".into());

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let layer = fmt::layer()
        .with_timer(fmt::time::ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(guard)
}
