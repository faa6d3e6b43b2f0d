// External command execution with a bounded wait

use crate::error::{Result, WatchdogError};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs, killing them if they outlive the timeout
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args`; a non-zero exit status is an error
    pub async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!("Running {} {:?}", program, args);

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WatchdogError::CommandFailed {
                program: program.to_string(),
                message: format!("failed to spawn: {}", e),
            })?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| WatchdogError::CommandTimeout {
                program: program.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|e| WatchdogError::CommandFailed {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let detail = if stderr.is_empty() { &stdout } else { &stderr };
            return Err(WatchdogError::CommandFailed {
                program: program.to_string(),
                message: format!("exited with {}: {}", output.status, detail),
            }
            .into());
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
