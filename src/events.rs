// Event sources feeding the watchdog loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

/// Events consumed, one at a time, by the watchdog loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Periodic check interval elapsed
    Tick,

    /// Operator command from the interactive front end
    Command(Command),

    /// Input that is not a known command
    Unknown(String),

    /// Shutdown requested by a signal
    Quit,
}

/// Interactive commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Check,
    Recover,
    Help,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "status" => Some(Command::Status),
            "check" => Some(Command::Check),
            "recover" => Some(Command::Recover),
            "help" | "?" => Some(Command::Help),
            "quit" | "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Convert one line of operator input to an event; blank lines are ignored
pub fn line_to_event(line: &str) -> Option<AppEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(match Command::parse(trimmed) {
        Some(command) => AppEvent::Command(command),
        None => AppEvent::Unknown(trimmed.to_string()),
    })
}

/// Spawn stdin command reader task
pub async fn spawn_input_handler(tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());

        while let Some(line) = lines.next().await {
            match line {
                Ok(line) => {
                    if let Some(event) = line_to_event(&line) {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read operator input: {}", e);
                    break;
                }
            }
        }

        tracing::debug!("Operator input closed");
    });
}

/// Allows one outstanding `Tick` at a time. The ticker takes the gate before
/// sending; the loop releases it once that tick's cycle has finished, so
/// intervals that elapse during a long recovery are skipped, not queued.
#[derive(Debug, Clone, Default)]
pub struct TickGate {
    pending: Arc<AtomicBool>,
}

impl TickGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate; false while a tick is still queued or being handled
    pub fn try_acquire(&self) -> bool {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Spawn periodic tick task; the first tick fires one full interval after start
pub async fn spawn_ticker(tx: mpsc::Sender<AppEvent>, interval: Duration, gate: TickGate) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + interval, interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !gate.try_acquire() {
                tracing::debug!("Previous cycle still running, skipping tick");
                continue;
            }
            if tx.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });
}

/// Spawn a task turning Ctrl-C / SIGTERM into a quit event
pub async fn spawn_signal_handler(tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        tx.send(AppEvent::Quit).await.ok();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {}", e);
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}
