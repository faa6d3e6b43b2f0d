// Configuration management

use crate::error::{Result, WatchdogError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gateway CLI used for both the status query and the start command
    pub gateway_program: String,
    pub status_args: Vec<String>,
    pub start_args: Vec<String>,
    /// Port the gateway listens on when healthy
    pub probe_port: u16,
    /// Substrings of the status output that count as "up"
    pub status_tokens: Vec<String>,

    pub control_host: String,
    pub control_port: u16,
    pub control_secret: Option<String>,
    pub control_path: String,

    pub check_interval_secs: u64,
    pub max_failures: u32,
    pub config_settle_secs: u64,
    pub restart_settle_secs: u64,
    pub settle_backoff: bool,
    pub command_timeout_secs: u64,
    pub http_timeout_secs: u64,

    pub notify_enabled: bool,
    pub notify_target: Option<String>,
    pub notify_program: String,
    pub notify_channel: String,

    pub log_file: Option<PathBuf>,
    pub pid_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_program: "openclaw".to_string(),
            status_args: vec!["gateway".to_string(), "status".to_string()],
            start_args: vec!["gateway".to_string(), "start".to_string()],
            probe_port: 16666,
            status_tokens: vec!["ok".to_string(), "running".to_string(), "active".to_string()],
            control_host: "127.0.0.1".to_string(),
            control_port: 9097,
            control_secret: None,
            control_path: "/configs?force=true".to_string(),
            check_interval_secs: 30,
            max_failures: 5,
            config_settle_secs: 3,
            restart_settle_secs: 6,
            settle_backoff: false,
            command_timeout_secs: 10,
            http_timeout_secs: 10,
            notify_enabled: true,
            notify_target: None,
            notify_program: "openclaw".to_string(),
            notify_channel: "whatsapp".to_string(),
            log_file: None,
            pid_file: None,
        }
    }
}

impl Config {
    /// Get default config path: ~/.config/gatewatch/config.yaml
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("gatewatch").join("config.yaml"))
    }

    /// Load config from path, falling back to defaults if not found
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Self::default_path().unwrap_or_default());

        let config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to path
    pub fn save(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Reject values the watchdog cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_failures == 0 {
            return Err(WatchdogError::Config("max_failures must be at least 1".to_string()).into());
        }
        if self.check_interval_secs == 0 {
            return Err(WatchdogError::Config("check_interval_secs must be at least 1".to_string()).into());
        }
        if self.gateway_program.trim().is_empty() {
            return Err(WatchdogError::Config("gateway_program cannot be empty".to_string()).into());
        }
        if self.probe_port == 0 || self.control_port == 0 {
            return Err(WatchdogError::Config("ports must be non-zero".to_string()).into());
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn config_settle(&self) -> Duration {
        Duration::from_secs(self.config_settle_secs)
    }

    pub fn restart_settle(&self) -> Duration {
        Duration::from_secs(self.restart_settle_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Full URL of the control-plane reload endpoint
    pub fn control_url(&self) -> String {
        let path = if self.control_path.starts_with('/') {
            self.control_path.clone()
        } else {
            format!("/{}", self.control_path)
        };
        format!("http://{}:{}{}", self.control_host, self.control_port, path)
    }

    /// Notification target, if notifications should be sent at all
    pub fn notify_target(&self) -> Option<&str> {
        if !self.notify_enabled {
            return None;
        }
        self.notify_target
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("watchdog.log"))
    }

    pub fn pid_path(&self) -> PathBuf {
        self.pid_file
            .clone()
            .unwrap_or_else(|| data_dir().join("gatewatch.pid"))
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gatewatch")
}
