// Gateway health probing

use crate::config::Config;
use crate::error::Result;
use crate::watchdog::command::CommandRunner;
use async_trait::async_trait;

/// Answers "is the gateway up?"
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Never fails: anything that goes wrong counts as down
    async fn is_running(&self) -> bool;
}

/// Probe that checks the listening socket first, then the gateway's own status command
pub struct GatewayProbe {
    runner: CommandRunner,
    program: String,
    status_args: Vec<String>,
    port: u16,
    tokens: Vec<String>,
}

impl GatewayProbe {
    pub fn from_config(config: &Config) -> Self {
        Self {
            runner: CommandRunner::new(config.command_timeout()),
            program: config.gateway_program.clone(),
            status_args: config.status_args.clone(),
            port: config.probe_port,
            tokens: config.status_tokens.clone(),
        }
    }

    /// Whether the OS reports a listening TCP socket on the gateway port
    #[cfg(target_os = "linux")]
    pub async fn port_listening(&self) -> Result<bool> {
        let mut read_any = false;
        let mut last_error = None;

        for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
            match tokio::fs::read_to_string(table).await {
                Ok(contents) => {
                    if proc_table_has_listener(&contents, self.port) {
                        return Ok(true);
                    }
                    read_any = true;
                }
                Err(e) => {
                    tracing::debug!("Cannot read {}: {}", table, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !read_any => Err(e.into()),
            _ => Ok(false),
        }
    }

    /// Whether the OS reports a listening TCP socket on the gateway port
    #[cfg(not(target_os = "linux"))]
    pub async fn port_listening(&self) -> Result<bool> {
        let args: Vec<String> = if cfg!(windows) {
            vec!["-ano".to_string()]
        } else {
            vec!["-an".to_string()]
        };
        let output = self.runner.run("netstat", &args).await?;
        Ok(netstat_has_listener(&output.stdout, self.port))
    }

    /// Whether the gateway's status command reports a healthy state
    pub async fn status_reports_up(&self) -> Result<bool> {
        let output = self.runner.run(&self.program, &self.status_args).await?;
        tracing::debug!("Gateway status output: {}", output.stdout);
        Ok(status_matches(&output.stdout, &self.tokens))
    }
}

#[async_trait]
impl HealthProbe for GatewayProbe {
    async fn is_running(&self) -> bool {
        match self.port_listening().await {
            Ok(true) => return true,
            Ok(false) => tracing::debug!("Nothing listening on port {}", self.port),
            Err(e) => tracing::debug!("Port check failed: {:#}", e),
        }

        match self.status_reports_up().await {
            Ok(up) => up,
            Err(e) => {
                tracing::debug!("Status check failed: {:#}", e);
                false
            }
        }
    }
}

/// Scan a /proc/net/tcp{,6} table for a LISTEN socket on `port`
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn proc_table_has_listener(contents: &str, port: u16) -> bool {
    const TCP_LISTEN: &str = "0A";

    contents.lines().skip(1).any(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields[3] != TCP_LISTEN {
            return false;
        }
        fields[1]
            .rsplit(':')
            .next()
            .and_then(|hex| u16::from_str_radix(hex, 16).ok())
            == Some(port)
    })
}

/// Scan `netstat -an`/`-ano` output for a listening socket on `port`
#[cfg_attr(target_os = "linux", allow(dead_code))]
pub(crate) fn netstat_has_listener(output: &str, port: u16) -> bool {
    let colon = format!(":{}", port);
    let dot = format!(".{}", port);

    output.lines().filter(|line| line.contains("LISTEN")).any(|line| {
        line.split_whitespace()
            .any(|token| token.ends_with(&colon) || token.ends_with(&dot))
    })
}

/// Loose substring match of the status output against the positive tokens.
/// Unrelated words containing a token (e.g. "broken") also match.
pub(crate) fn status_matches(output: &str, tokens: &[String]) -> bool {
    let output = output.to_lowercase();
    tokens
        .iter()
        .filter(|token| !token.is_empty())
        .any(|token| output.contains(&token.to_lowercase()))
}
