//! tapper — operator console for the solenoid tapper.
//!
//! Subcommands:
//! - `tapper ports` - list attached serial devices
//! - `tapper run` - run a tap session with live status
//!
//! While a session runs, stdin is the keypad:
//!
//! | Input               | Action        |
//! |---------------------|---------------|
//! | empty line, `p`     | pause/resume  |
//! | `q`, `s`            | stop          |

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;

use tapper::adapters::log_sink::LogEventSink;
use tapper::adapters::serial::{self, SerialConnector};
use tapper::app::commands::SessionCommand;
use tapper::app::events::format_hms;
use tapper::config::NO_DEVICES;
use tapper::{Error, SessionConfig, SessionState, TapSession};

#[derive(Parser)]
#[command(name = "tapper")]
#[command(about = "Relay-driven solenoid tapper controller")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial devices the relay board could be on
    Ports,

    /// Run a tap session
    Run {
        /// JSON config file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Serial device (default: first one found)
        #[arg(short, long)]
        port: Option<String>,

        /// Seconds between tap starts
        #[arg(short, long)]
        interval: Option<f64>,

        /// Number of taps, 0 for unlimited
        #[arg(short, long)]
        taps: Option<u32>,

        /// Tap force: seconds the relay stays energised
        #[arg(short, long)]
        duration: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ports => list_ports(),
        Commands::Run {
            config,
            port,
            interval,
            taps,
            duration,
        } => {
            let mut cfg = match config {
                Some(path) => SessionConfig::load_json(path)?,
                None => SessionConfig::default(),
            };
            cfg.port = port.unwrap_or_else(|| {
                if cfg.port == NO_DEVICES {
                    serial::default_port()
                } else {
                    cfg.port.clone()
                }
            });
            if let Some(v) = interval {
                cfg.interval_secs = v;
            }
            if let Some(v) = taps {
                cfg.max_taps = v;
            }
            if let Some(v) = duration {
                cfg.tap_duration_secs = v;
            }
            run(cfg)
        }
    }
}

fn list_ports() -> Result<()> {
    let ports = serial::available_ports();
    if ports.is_empty() {
        println!("{NO_DEVICES}");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

fn run(config: SessionConfig) -> Result<()> {
    let session = TapSession::new(SerialConnector::default(), LogEventSink::new());

    match session.start(config) {
        Ok(()) => {}
        Err(e @ Error::Config(_)) => bail!("Input Error: {e}"),
        Err(e @ Error::Transport(_)) => bail!("Serial Error: {e}"),
        Err(e) => return Err(e).context("starting session"),
    }
    info!("Enter: pause/resume | q: stop");

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("keypad".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let cmd = match line.trim() {
                    "" | "p" => SessionCommand::TogglePause,
                    "q" | "s" => SessionCommand::Stop,
                    other => {
                        eprintln!("unknown input {other:?} (Enter = pause, q = stop)");
                        continue;
                    }
                };
                if tx.send(cmd).is_err() {
                    break;
                }
            }
        })
        .context("spawning keypad reader")?;

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(cmd) => session.handle_command(cmd)?,
            Err(RecvTimeoutError::Timeout) => {}
            // stdin closed: keep running until the limit or a fault
            Err(RecvTimeoutError::Disconnected) => thread::sleep(Duration::from_secs(1)),
        }
        let status = session.status();
        if status.state == SessionState::Idle {
            break;
        }
        println!("{status}");
    }
    session.stop();

    if let Some(report) = session.last_report() {
        println!(
            "Session finished: {} | taps {} | {}",
            report.reason,
            report.taps_completed,
            format_hms(report.elapsed)
        );
    }
    if let Some(fault) = session.last_fault() {
        bail!("Serial Error: {fault}");
    }
    Ok(())
}
