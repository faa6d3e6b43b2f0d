// Gatewatch - self-healing gateway watchdog
// Library root

pub mod app;
pub mod config;
pub mod daemon;
pub mod display;
pub mod error;
pub mod events;
pub mod logging;
pub mod version;
pub mod watchdog;

#[cfg(test)]
mod config_tests;
