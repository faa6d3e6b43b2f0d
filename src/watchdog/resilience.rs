// Pacing of recovery steps

use crate::config::Config;
use std::time::Duration;

/// Upper bound for the growing restart settle delay
const MAX_SETTLE: Duration = Duration::from_secs(60);

/// How long to wait after a restart before verifying
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryStrategy {
    /// Verify immediately
    Immediate,
    /// Same delay for every attempt
    FixedDelay(Duration),
    /// Delay grows with each consecutive failed attempt
    ExponentialBackoff { base_delay: Duration, max_delay: Duration, multiplier: f64 },
}

impl Default for RecoveryStrategy {
    fn default() -> Self {
        Self::FixedDelay(Duration::from_secs(6))
    }
}

impl RecoveryStrategy {
    /// Restart pacing described by the configuration
    pub fn from_config(config: &Config) -> Self {
        let base = config.restart_settle();
        if base.is_zero() {
            RecoveryStrategy::Immediate
        } else if config.settle_backoff {
            RecoveryStrategy::ExponentialBackoff {
                base_delay: base,
                max_delay: MAX_SETTLE.max(base),
                multiplier: 2.0,
            }
        } else {
            RecoveryStrategy::FixedDelay(base)
        }
    }

    /// Delay for a 1-based attempt number
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RecoveryStrategy::Immediate => Duration::ZERO,
            RecoveryStrategy::FixedDelay(duration) => *duration,
            RecoveryStrategy::ExponentialBackoff { base_delay, max_delay, multiplier } => {
                let exponent = attempt.max(1) as i32 - 1;
                let delay_ms = base_delay.as_millis() as f64 * multiplier.powi(exponent);
                let delay = Duration::from_millis(delay_ms.min(max_delay.as_millis() as f64) as u64);
                delay.min(*max_delay)
            }
        }
    }
}
