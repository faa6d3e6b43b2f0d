// Watchdog loop: periodic probing, recovery dispatch and operator commands

use crate::config::Config;
use crate::display;
use crate::error::Result;
use crate::events::{AppEvent, Command, TickGate};
use crate::watchdog::{
    notifier_from_config, GatewayActions, GatewayProbe, HealthProbe, Notifier, RecoveryActions,
    RecoveryOrchestrator, RecoveryOutcome, RecoveryStrategy, WatchdogState,
};
use futures::FutureExt;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Lifecycle of the watchdog loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Probing,
    Recovering,
    Stopped,
}

/// Owns the watchdog state; every mutation happens on the loop that drives it
pub struct App {
    pub state: WatchdogState,
    pub phase: Phase,
    pub config: Config,
    pub interactive: bool,
    probe: Arc<dyn HealthProbe>,
    orchestrator: RecoveryOrchestrator,
    tick_gate: TickGate,
}

impl App {
    pub fn new(
        config: Config,
        probe: Arc<dyn HealthProbe>,
        actions: Arc<dyn RecoveryActions>,
        notifier: Arc<dyn Notifier>,
        interactive: bool,
    ) -> Self {
        let orchestrator = RecoveryOrchestrator::new(
            probe.clone(),
            actions,
            notifier,
            config.config_settle(),
            RecoveryStrategy::from_config(&config),
        );

        Self {
            state: WatchdogState::new(config.max_failures),
            phase: Phase::Idle,
            config,
            interactive,
            probe,
            orchestrator,
            tick_gate: TickGate::new(),
        }
    }

    /// Wire up the real probe, actions and notifier
    pub fn from_config(config: Config, interactive: bool) -> Result<Self> {
        let probe: Arc<dyn HealthProbe> = Arc::new(GatewayProbe::from_config(&config));
        let actions: Arc<dyn RecoveryActions> = Arc::new(GatewayActions::from_config(&config)?);
        let notifier = notifier_from_config(&config);
        Ok(Self::new(config, probe, actions, notifier, interactive))
    }

    /// Gate shared with the ticker; released after each tick is handled
    pub fn tick_gate(&self) -> TickGate {
        self.tick_gate.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    /// Log the startup configuration and enter periodic probing
    pub fn start(&mut self) {
        self.state.running = true;
        self.phase = Phase::Probing;

        tracing::info!("Gateway watchdog started");
        tracing::info!("Check interval: {}s", self.config.check_interval_secs);
        tracing::info!(
            "Gateway: {} (port {})",
            self.config.gateway_program,
            self.config.probe_port
        );
        tracing::info!(
            "Control plane: {}:{}",
            self.config.control_host,
            self.config.control_port
        );
        tracing::info!("Max consecutive failures: {}", self.config.max_failures);
    }

    /// Consume events until stopped or every producer has gone away
    pub async fn run(&mut self, rx: &mut mpsc::Receiver<AppEvent>) -> Result<()> {
        if self.phase == Phase::Idle {
            self.start();
        }
        if self.interactive {
            self.print(&display::render_status(&self.state, self.phase, &self.config))?;
        }

        while let Some(event) = rx.recv().await {
            let is_tick = event == AppEvent::Tick;
            let handled = AssertUnwindSafe(self.handle_event(event)).catch_unwind().await;
            match handled {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Event handling failed: {:#}", e),
                Err(_) => {
                    tracing::error!("Event handler panicked, watchdog keeps running");
                    if self.phase == Phase::Recovering {
                        self.phase = Phase::Probing;
                    }
                }
            }
            if is_tick {
                self.tick_gate.release();
            }

            if self.is_stopped() {
                break;
            }
        }

        tracing::info!(
            "Watchdog stopped after {} checks and {} recoveries",
            self.state.check_count,
            self.state.recovery_count
        );
        Ok(())
    }

    pub async fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        if self.is_stopped() {
            return Ok(());
        }

        match event {
            AppEvent::Tick => {
                self.run_cycle().await;
                if self.interactive && !self.is_stopped() {
                    self.print(&display::render_status(&self.state, self.phase, &self.config))?;
                }
            }
            AppEvent::Command(command) => self.handle_command(command).await?,
            AppEvent::Unknown(input) => {
                self.print(&format!("Unknown command: {}\n{}", input, display::HELP))?;
            }
            AppEvent::Quit => self.request_stop(),
        }

        Ok(())
    }

    async fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Status => {
                self.print(&display::render_status(&self.state, self.phase, &self.config))?;
            }
            Command::Check => {
                let outcome = self.force_check().await;
                let line = match outcome {
                    None => "Gateway is up".to_string(),
                    Some(outcome) => format!("Gateway was down, recovery result: {:?}", outcome),
                };
                self.print(&display::console_line(&line))?;
            }
            Command::Recover => {
                let outcome = self.force_recover().await;
                self.print(&display::console_line(&format!("Manual recovery: {:?}", outcome)))?;
            }
            Command::Help => self.print(display::HELP)?,
            Command::Quit => self.request_stop(),
        }
        Ok(())
    }

    /// Probe once; on a down result run exactly one recovery.
    /// Returns the recovery outcome, or `None` when the gateway was up.
    pub async fn run_cycle(&mut self) -> Option<RecoveryOutcome> {
        let running = self.probe.is_running().await;
        let status = self.state.record_check(running);
        tracing::info!("Check #{}: gateway {}", self.state.check_count, status.label());

        if running {
            return None;
        }

        Some(self.recover().await)
    }

    /// Operator-triggered check, same path as a periodic one
    pub async fn force_check(&mut self) -> Option<RecoveryOutcome> {
        tracing::info!("Manual check requested");
        self.run_cycle().await
    }

    /// Operator-triggered recovery; clears the failure count first
    pub async fn force_recover(&mut self) -> RecoveryOutcome {
        tracing::info!(
            "Manual recovery requested, resetting consecutive failures ({})",
            self.state.consecutive_failures()
        );
        self.state.failures.reset();
        self.recover().await
    }

    pub fn request_stop(&mut self) {
        self.stop("stop requested");
    }

    async fn recover(&mut self) -> RecoveryOutcome {
        self.phase = Phase::Recovering;
        let outcome = self.orchestrator.recover(&mut self.state).await;

        if outcome == RecoveryOutcome::GaveUp {
            self.stop("recovery attempts exhausted, waiting for manual intervention");
        } else {
            self.phase = Phase::Probing;
        }
        outcome
    }

    fn stop(&mut self, reason: &str) {
        if self.phase != Phase::Stopped {
            tracing::info!("Watchdog stopping: {}", reason);
        }
        self.phase = Phase::Stopped;
        self.state.running = false;
    }

    fn print(&self, text: &str) -> Result<()> {
        if self.interactive {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text)?;
            stdout.flush()?;
        }
        Ok(())
    }
}
