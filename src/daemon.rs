// Detached launch, pid file and stop support

use crate::error::{Result, WatchdogError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Pid file owned by a running watchdog; removed on drop
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn create(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, std::process::id().to_string())?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pid recorded at `path`, if the file exists
    pub fn read(path: &Path) -> Result<Option<u32>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        let pid = contents.trim().parse::<u32>().map_err(|_| {
            WatchdogError::Daemon(format!("invalid pid file {}: {:?}", path.display(), contents.trim()))
        })?;
        Ok(Some(pid))
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Result of `stop_running`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotRunning,
    Stopped(u32),
    /// Pid file pointed at a process that could not be signalled; file removed
    Stale(u32),
}

/// Relaunch this executable as a headless watchdog detached from the terminal
pub fn spawn_detached(config_path: Option<&Path>, debug: bool) -> Result<u32> {
    let exe = std::env::current_exe()?;

    let mut command = Command::new(exe);
    if debug {
        command.arg("--debug");
    }
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    command
        .args(["run", "--headless"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach(&mut command);

    let child = command
        .spawn()
        .map_err(|e| WatchdogError::Daemon(format!("failed to launch watchdog: {}", e)))?;

    tracing::info!("Launched detached watchdog with pid {}", child.id());
    Ok(child.id())
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}

/// Terminate the watchdog recorded in the pid file
pub fn stop_running(pid_path: &Path) -> Result<StopOutcome> {
    let Some(pid) = PidFile::read(pid_path)? else {
        return Ok(StopOutcome::NotRunning);
    };

    let outcome = match terminate(pid) {
        Ok(()) => StopOutcome::Stopped(pid),
        Err(e) => {
            tracing::warn!("Could not stop process {}: {:#}", pid, e);
            StopOutcome::Stale(pid)
        }
    };

    if pid_path.exists() {
        std::fs::remove_file(pid_path)?;
    }
    Ok(outcome)
}

fn terminate(pid: u32) -> Result<()> {
    let pid_arg = pid.to_string();
    let output = if cfg!(windows) {
        Command::new("taskkill").args(["/F", "/PID", &pid_arg]).output()?
    } else {
        Command::new("kill").args(["-TERM", &pid_arg]).output()?
    };

    if output.status.success() {
        Ok(())
    } else {
        Err(WatchdogError::Daemon(format!(
            "could not stop process {}: {}",
            pid,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
        .into())
    }
}
