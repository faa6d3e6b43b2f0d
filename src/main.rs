// Gatewatch - self-healing gateway watchdog
// Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use gatewatch::app::App;
use gatewatch::config::Config;
use gatewatch::daemon::{self, PidFile, StopOutcome};
use gatewatch::events::{spawn_input_handler, spawn_signal_handler, spawn_ticker, AppEvent};
use gatewatch::logging;
use gatewatch::version::build_info;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "gatewatch")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show version information
    #[arg(short = 'V', long)]
    version: bool,

    /// Show detailed build information
    #[arg(long)]
    build_info: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the watchdog in the foreground (default)
    Run {
        /// Do not read commands from stdin or print the status panel
        #[arg(long)]
        headless: bool,
    },
    /// Start a headless watchdog detached from this terminal
    Spawn,
    /// Stop the watchdog recorded in the pid file
    Stop,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", build_info().format_display());
        return Ok(());
    }

    if cli.build_info {
        println!("{}", build_info().format_display());
        println!("\n{}", build_info().format_build_info());
        return Ok(());
    }

    let config = Config::load(cli.config.clone())?;

    match cli.command.unwrap_or(Commands::Run { headless: false }) {
        Commands::Stop => {
            match daemon::stop_running(&config.pid_path())? {
                StopOutcome::NotRunning => println!("No running watchdog found"),
                StopOutcome::Stopped(pid) => println!("Stopped watchdog (pid {})", pid),
                StopOutcome::Stale(pid) => {
                    println!("Watchdog pid {} was not running; removed stale pid file", pid)
                }
            }
            Ok(())
        }
        Commands::Spawn => {
            let pid = daemon::spawn_detached(cli.config.as_deref(), cli.debug)?;
            println!("Watchdog started in the background (pid {})", pid);
            println!("Logging to {}", config.log_path().display());
            Ok(())
        }
        Commands::Run { headless } => {
            logging::init(&config, cli.debug)?;
            run_watchdog(config, headless).await
        }
    }
}

async fn run_watchdog(config: Config, headless: bool) -> Result<()> {
    let _pid_file = PidFile::create(config.pid_path())?;

    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    let mut app = App::from_config(config, !headless)?;

    if !headless {
        spawn_input_handler(tx.clone()).await;
    }
    spawn_ticker(tx.clone(), app.config.check_interval(), app.tick_gate()).await;
    spawn_signal_handler(tx.clone()).await;
    drop(tx);

    app.run(&mut rx).await?;

    if !headless {
        println!("Watchdog stopped. Goodbye!");
    }
    Ok(())
}
