// Operator notifications

use crate::config::Config;
use crate::error::{Result, WatchdogError};
use chrono::Local;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Fire-and-forget outbound message channel
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Hand the message off for delivery without waiting for it
    fn notify(&self, message: &str) -> Result<()>;
}

/// Sends messages through the gateway CLI's messaging subcommand
pub struct CommandNotifier {
    program: String,
    channel: String,
    target: String,
    timeout: Duration,
}

impl CommandNotifier {
    pub fn new(program: String, channel: String, target: String, timeout: Duration) -> Self {
        Self {
            program,
            channel,
            target,
            timeout,
        }
    }

    fn args(&self, body: &str) -> Vec<String> {
        vec![
            "message".to_string(),
            "send".to_string(),
            "--channel".to_string(),
            self.channel.clone(),
            "--to".to_string(),
            self.target.clone(),
            body.to_string(),
        ]
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WatchdogError::Notification(e.to_string()))?;

        let body = format!("[{}] {}", timestamp(), message);
        let child = Command::new(&self.program)
            .args(self.args(&body))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                WatchdogError::Notification(format!("failed to spawn {}: {}", self.program, e))
            })?;

        let timeout = self.timeout;
        runtime.spawn(async move {
            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(Ok(output)) if output.status.success() => {
                    tracing::info!("Notification delivered");
                }
                Ok(Ok(output)) => {
                    tracing::warn!(
                        "Notification command exited with {}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Ok(Err(e)) => tracing::warn!("Notification command failed: {}", e),
                Err(_) => tracing::warn!("Notification command timed out after {:?}", timeout),
            }
        });

        Ok(())
    }
}

/// Used when notifications are switched off or have no target
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        tracing::debug!("Notification suppressed: {}", message);
        Ok(())
    }
}

pub fn notifier_from_config(config: &Config) -> Arc<dyn Notifier> {
    match config.notify_target() {
        Some(target) => Arc::new(CommandNotifier::new(
            config.notify_program.clone(),
            config.notify_channel.clone(),
            target.to_string(),
            config.command_timeout(),
        )),
        None => {
            tracing::info!("Notifications disabled");
            Arc::new(DisabledNotifier)
        }
    }
}

/// Local wall-clock time in the message prefix format
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_last_argument() {
        let notifier = CommandNotifier::new(
            "openclaw".to_string(),
            "whatsapp".to_string(),
            "5550100".to_string(),
            Duration::from_secs(1),
        );
        let args = notifier.args("[t] Gateway down; restarting \"now\"");
        assert_eq!(&args[..6], ["message", "send", "--channel", "whatsapp", "--to", "5550100"]);
        assert_eq!(args[6], "[t] Gateway down; restarting \"now\"");
    }

    #[test]
    fn test_notify_outside_runtime_is_an_error() {
        let notifier = CommandNotifier::new(
            "true".to_string(),
            "whatsapp".to_string(),
            "5550100".to_string(),
            Duration::from_secs(1),
        );
        assert!(notifier.notify("hello").is_err());
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let notifier = CommandNotifier::new(
            "/nonexistent/gatewatch-notify".to_string(),
            "whatsapp".to_string(),
            "5550100".to_string(),
            Duration::from_secs(1),
        );
        let err = notifier.notify("hello").unwrap_err();
        assert!(err.to_string().contains("Failed to deliver notification"));
    }

    #[test]
    fn test_disabled_notifier_accepts_everything() {
        assert!(DisabledNotifier.notify("anything").is_ok());
    }

    #[test]
    fn test_notifier_from_config_without_target() {
        let config = Config::default();
        // No target configured: must not try to spawn anything, even outside a runtime
        assert!(notifier_from_config(&config).notify("hello").is_ok());
    }
}
