// Plain-text console output for the interactive front end

use crate::app::Phase;
use crate::config::Config;
use crate::watchdog::state::{format_timestamp, format_uptime};
use crate::watchdog::{CheckStatus, WatchdogState};
use crossterm::style::Stylize;

pub const HELP: &str = "Commands: status | check | recover | quit (q)";

/// Status panel shown by the `status` command and after each check
pub fn render_status(state: &WatchdogState, phase: Phase, config: &Config) -> String {
    let gateway = match state.last_check_status {
        CheckStatus::Up => "Up".green().to_string(),
        CheckStatus::Down => "Down".red().to_string(),
        CheckStatus::Unknown => "Unknown".yellow().to_string(),
    };

    let lines = [
        "Gateway watchdog".bold().to_string(),
        format!("  Gateway:         {}", gateway),
        format!("  Watchdog:        {:?}", phase),
        format!("  Checks:          {}", state.check_count),
        format!("  Recoveries:      {}", state.recovery_count),
        format!(
            "  Failures:        {}/{}",
            state.consecutive_failures(),
            state.failures.max_failures()
        ),
        format!("  Uptime:          {}", format_uptime(state.uptime())),
        format!("  Last recovery:   {}", format_timestamp(state.last_recovery_time)),
        format!("  Check interval:  {}s", config.check_interval_secs),
        format!("  Control plane:   {}:{}", config.control_host, config.control_port),
        String::new(),
        HELP.dark_grey().to_string(),
    ];

    lines.join("\n")
}

/// Timestamped console line
pub fn console_line(message: &str) -> String {
    format!("[{}] {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"), message)
}
