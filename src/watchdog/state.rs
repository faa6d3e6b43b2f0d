// Watchdog state and consecutive-failure accounting

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Result of the most recent health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Unknown,
    Up,
    Down,
}

impl CheckStatus {
    pub fn from_running(running: bool) -> Self {
        if running {
            CheckStatus::Up
        } else {
            CheckStatus::Down
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Unknown => "Unknown",
            CheckStatus::Up => "Up",
            CheckStatus::Down => "Down",
        }
    }
}

/// Counts recovery attempts since the last success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureTracker {
    consecutive_failures: u32,
    max_failures: u32,
}

impl FailureTracker {
    pub fn new(max_failures: u32) -> Self {
        Self {
            consecutive_failures: 0,
            max_failures,
        }
    }

    pub fn on_recovery_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn on_recovery_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// Operator-requested reset
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.consecutive_failures >= self.max_failures
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }
}

/// Process-wide watchdog counters, owned by the event loop
#[derive(Debug, Clone)]
pub struct WatchdogState {
    pub running: bool,
    pub check_count: u64,
    pub recovery_count: u64,
    pub attempt_count: u64,
    pub last_recovery_time: Option<DateTime<Local>>,
    pub last_attempt_time: Option<DateTime<Local>>,
    pub last_check_status: CheckStatus,
    /// Record of the most recent recovery attempt
    pub last_attempt: Option<RecoveryAttempt>,
    pub failures: FailureTracker,
    pub started_at: Instant,
}

impl WatchdogState {
    pub fn new(max_failures: u32) -> Self {
        Self {
            running: false,
            check_count: 0,
            recovery_count: 0,
            attempt_count: 0,
            last_recovery_time: None,
            last_attempt_time: None,
            last_check_status: CheckStatus::Unknown,
            last_attempt: None,
            failures: FailureTracker::new(max_failures),
            started_at: Instant::now(),
        }
    }

    /// Fold a periodic probe result into the counters
    pub fn record_check(&mut self, running: bool) -> CheckStatus {
        self.check_count += 1;
        self.last_check_status = CheckStatus::from_running(running);
        self.last_check_status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures.consecutive_failures()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// One-line summary used when automatic recovery gives up
    pub fn diagnostic_summary(&self) -> String {
        format!(
            "checks: {}, recovery attempts: {}, recoveries: {}, uptime: {}, last attempt: {}",
            self.check_count,
            self.attempt_count,
            self.recovery_count,
            format_uptime(self.uptime()),
            format_timestamp(self.last_attempt_time),
        )
    }
}

/// Overall result of a single refresh/restart/verify cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    PartialFailure,
}

/// Transient record of one recovery attempt
#[derive(Debug, Clone)]
pub struct RecoveryAttempt {
    pub started_at: DateTime<Local>,
    pub refresh_result: bool,
    pub restart_result: bool,
    pub verify_result: bool,
    pub outcome: AttemptOutcome,
}

impl RecoveryAttempt {
    pub fn begin() -> Self {
        Self {
            started_at: Local::now(),
            refresh_result: false,
            restart_result: false,
            verify_result: false,
            outcome: AttemptOutcome::PartialFailure,
        }
    }

    pub fn finish(&mut self, verified: bool) {
        self.verify_result = verified;
        self.outcome = if verified {
            AttemptOutcome::Success
        } else {
            AttemptOutcome::PartialFailure
        };
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Local::now() - self.started_at
    }
}

/// Format a duration as "1h 2m 3s", or "2m 3s" below an hour
pub fn format_uptime(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}

pub fn format_timestamp(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string())
}
