// Gateway watchdog core: probing, remediation and failure accounting

pub mod actions;
pub mod command;
pub mod notify;
pub mod orchestrator;
pub mod probe;
pub mod resilience;
pub mod state;


pub use actions::{GatewayActions, RecoveryActions};
pub use command::{CommandOutput, CommandRunner};
pub use notify::{notifier_from_config, CommandNotifier, DisabledNotifier, Notifier};
pub use orchestrator::{RecoveryOrchestrator, RecoveryOutcome};
pub use probe::{GatewayProbe, HealthProbe};
pub use resilience::RecoveryStrategy;
pub use state::{AttemptOutcome, CheckStatus, FailureTracker, RecoveryAttempt, WatchdogState};
