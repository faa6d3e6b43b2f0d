// Remediation steps: control-plane refresh and gateway restart

use crate::config::Config;
use crate::error::{Result, WatchdogError};
use crate::watchdog::command::CommandRunner;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

/// The two remediation steps of a recovery attempt.
/// Both are safe to repeat; the caller decides what a failure means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecoveryActions: Send + Sync {
    /// Ask the local control plane to reload its upstream configuration
    async fn refresh_upstream_config(&self) -> Result<()>;

    /// Run the gateway's start command
    async fn restart_service(&self) -> Result<()>;
}

pub struct GatewayActions {
    http: reqwest::Client,
    control_url: String,
    secret: Option<String>,
    runner: CommandRunner,
    program: String,
    start_args: Vec<String>,
}

impl GatewayActions {
    pub fn from_config(config: &Config) -> Result<Self> {
        // The control plane is usually the proxy being refreshed, so never route through it
        let http = reqwest::Client::builder()
            .user_agent(concat!("gatewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout())
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            control_url: config.control_url(),
            secret: config
                .control_secret
                .clone()
                .filter(|secret| !secret.is_empty()),
            runner: CommandRunner::new(config.command_timeout()),
            program: config.gateway_program.clone(),
            start_args: config.start_args.clone(),
        })
    }
}

#[async_trait]
impl RecoveryActions for GatewayActions {
    async fn refresh_upstream_config(&self) -> Result<()> {
        tracing::info!("Refreshing upstream configuration via {}", self.control_url);

        let mut request = self
            .http
            .put(&self.control_url)
            .header(CONTENT_TYPE, "application/json")
            .body("{}");
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WatchdogError::ControlPlane(e.to_string()))?;

        let status = response.status();
        tracing::debug!("Control plane responded with {}", status);

        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(WatchdogError::ControlPlaneStatus(status.as_u16()).into())
        }
    }

    async fn restart_service(&self) -> Result<()> {
        tracing::info!("Starting gateway: {} {}", self.program, self.start_args.join(" "));

        let output = self.runner.run(&self.program, &self.start_args).await?;
        if !output.stdout.is_empty() {
            tracing::info!("Start command output: {}", output.stdout);
        }
        Ok(())
    }
}
