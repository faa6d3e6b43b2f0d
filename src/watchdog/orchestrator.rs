// Recovery sequencing

use crate::watchdog::actions::RecoveryActions;
use crate::watchdog::notify::Notifier;
use crate::watchdog::probe::HealthProbe;
use crate::watchdog::resilience::RecoveryStrategy;
use crate::watchdog::state::{CheckStatus, RecoveryAttempt, WatchdogState};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// What a call to [`RecoveryOrchestrator::recover`] achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Gateway verified up after the attempt
    Recovered,
    /// Failure threshold already reached; automatic recovery must stop
    GaveUp,
    /// Attempt ran but the gateway is still down
    AttemptFailed,
}

/// Runs the refresh -> settle -> restart -> settle -> verify sequence
pub struct RecoveryOrchestrator {
    probe: Arc<dyn HealthProbe>,
    actions: Arc<dyn RecoveryActions>,
    notifier: Arc<dyn Notifier>,
    config_settle: Duration,
    restart_pacing: RecoveryStrategy,
}

impl RecoveryOrchestrator {
    pub fn new(
        probe: Arc<dyn HealthProbe>,
        actions: Arc<dyn RecoveryActions>,
        notifier: Arc<dyn Notifier>,
        config_settle: Duration,
        restart_pacing: RecoveryStrategy,
    ) -> Self {
        Self {
            probe,
            actions,
            notifier,
            config_settle,
            restart_pacing,
        }
    }

    /// Attempt to bring the gateway back. Only called after a probe reported it down.
    ///
    /// Step failures are logged and never abort the sequence; the verification
    /// probe alone decides between `Recovered` and `AttemptFailed`.
    pub async fn recover(&self, state: &mut WatchdogState) -> RecoveryOutcome {
        let failures = state.consecutive_failures();
        let max_failures = state.failures.max_failures();

        if state.failures.is_exhausted() {
            self.give_up(state);
            return RecoveryOutcome::GaveUp;
        }

        let attempt_number = failures + 1;
        tracing::warn!(
            "Gateway is down, starting recovery attempt {}/{} (checks so far: {})",
            attempt_number,
            max_failures,
            state.check_count
        );
        self.send(&format!(
            "Gateway is down. Starting recovery ({}/{})",
            attempt_number, max_failures
        ));

        let mut attempt = RecoveryAttempt::begin();
        state.attempt_count += 1;
        state.last_attempt_time = Some(attempt.started_at);

        tracing::info!("Step 1/2: refreshing upstream configuration");
        attempt.refresh_result = match self.actions.refresh_upstream_config().await {
            Ok(()) => {
                tracing::info!("Upstream configuration refreshed");
                true
            }
            Err(e) => {
                tracing::warn!("Upstream refresh failed, restarting the gateway anyway: {:#}", e);
                false
            }
        };

        tracing::debug!("Waiting {:?} for the configuration to settle", self.config_settle);
        sleep(self.config_settle).await;

        tracing::info!("Step 2/2: restarting the gateway");
        // A failed start command is tolerated; verification decides
        if let Err(e) = self.actions.restart_service().await {
            tracing::warn!("Start command failed, leaving the verdict to verification: {:#}", e);
        }
        attempt.restart_result = true;

        let settle = self.restart_pacing.delay(attempt_number as usize);
        tracing::debug!("Waiting {:?} for the gateway to come up", settle);
        sleep(settle).await;

        attempt.finish(self.probe.is_running().await);
        tracing::info!(
            "Recovery attempt finished in {}ms: refresh={} restart={} verified={} outcome={:?}",
            attempt.elapsed().num_milliseconds(),
            attempt.refresh_result,
            attempt.restart_result,
            attempt.verify_result,
            attempt.outcome
        );
        let verified = attempt.verify_result;
        state.last_attempt = Some(attempt);

        if verified {
            state.failures.on_recovery_success();
            state.recovery_count += 1;
            state.last_recovery_time = Some(Local::now());
            state.last_check_status = CheckStatus::Up;

            tracing::info!("Gateway recovered, consecutive failures reset to 0");
            self.send(&format!(
                "Gateway is back online (recovery #{})",
                state.recovery_count
            ));
            RecoveryOutcome::Recovered
        } else {
            state.failures.on_recovery_failure();
            let failures = state.consecutive_failures();

            if state.failures.is_exhausted() {
                tracing::warn!(
                    "Consecutive failures: {}/{}. Monitoring stops the next time the gateway is found down",
                    failures,
                    max_failures
                );
            } else {
                tracing::warn!(
                    "Consecutive failures: {}/{}. Will try again on the next check",
                    failures,
                    max_failures
                );
            }
            RecoveryOutcome::AttemptFailed
        }
    }

    fn give_up(&self, state: &WatchdogState) {
        let max_failures = state.failures.max_failures();
        let summary = state.diagnostic_summary();

        tracing::error!(
            "Reached the maximum of {} consecutive failed recoveries, stopping automatic recovery",
            max_failures
        );
        tracing::error!("Diagnostics: {}", summary);
        tracing::error!(
            "Check the network and the control plane, refresh its configuration and start the gateway by hand"
        );

        self.send(&format!(
            "Gateway recovery FAILED after {} consecutive attempts. {}. Manual intervention required.",
            max_failures, summary
        ));
    }

    fn send(&self, message: &str) {
        if let Err(e) = self.notifier.notify(message) {
            tracing::warn!("Notification not sent: {:#}", e);
        }
    }
}
