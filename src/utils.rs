use std::path::PathBuf;

use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, Result};

/// Leave raw mode before the default hook prints, or the message is mangled.
pub fn init_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

pub fn restore_terminal() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(std::io::stdout(), Show)?;
    Ok(())
}

pub fn init_tracing(log_level: &str) -> Result<()> {
    // The console belongs to the menu, so logs go to opsmenu.log in the working directory
    let file_appender = tracing_appender::rolling::never(".", "opsmenu.log");

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Priority: RUST_LOG env var > command line arg
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::ConfigError(format!("Failed to initialize tracing: {}", e)))?;

    // Logging lasts for the whole process
    std::mem::forget(_guard);

    Ok(())
}

/// Expand a leading `~/` against the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
