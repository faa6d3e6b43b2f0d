// Persistent log file setup

use crate::config::Config;
use crate::error::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

/// Create (or truncate) the log file. Everything written through the
/// returned handle afterwards is appended in order.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Install the global tracing subscriber writing to the configured log file
pub fn init(config: &Config, debug: bool) -> Result<()> {
    let log_path = config.log_path();
    let log_file = open_log_file(&log_path)?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("Gatewatch starting, logging to {}", log_path.display());
    Ok(())
}
