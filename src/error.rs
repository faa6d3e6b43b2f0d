// Error types for gatewatch

use std::time::Duration;
use thiserror::Error;

/// Result type alias using anyhow::Error
pub type Result<T> = anyhow::Result<T>;

/// Gatewatch-specific error types
#[derive(Error, Debug)]
pub enum WatchdogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to run '{program}': {message}")]
    CommandFailed { program: String, message: String },

    #[error("Command '{program}' did not finish within {timeout:?}")]
    CommandTimeout { program: String, timeout: Duration },

    #[error("Control plane request failed: {0}")]
    ControlPlane(String),

    #[error("Control plane answered with status {0}")]
    ControlPlaneStatus(u16),

    #[error("Failed to deliver notification: {0}")]
    Notification(String),

    #[error("Daemon error: {0}")]
    Daemon(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
