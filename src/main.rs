//! Sensor console
//!
//! This service:
//! - Reads JSON telemetry from the instrument's serial port
//! - Decodes anemometer, particulate-matter and IMU messages into records
//! - Renders the updated records as a tabbed text display on stdout
//! - Sends operator commands typed on stdin back to the instrument
//!
//! Architecture: serial → channel → console (decode + render) → stdout,
//! stdin → channel → console → channel → serial

use anyhow::{Context, Result};
use sensor_console::command::Command;
use sensor_console::config::Config;
use sensor_console::console::Console;
use sensor_console::screen::{Screen, Tab};
use sensor_console::serial;
use serde_json::Value;
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Decode incoming messages and execute operator commands.
///
/// This task is the only owner of the console, so decoding and rendering
/// never overlap.
async fn process_messages(
    mut messages: mpsc::Receiver<Value>,
    mut commands: mpsc::Receiver<Command>,
    outbound: mpsc::Sender<String>,
    status_history: usize,
) {
    info!("Starting message processor");

    let mut console = Console::new(Screen::new(status_history));
    print!("{}", console.render().draw(Tab::Cmd));

    loop {
        tokio::select! {
            Some(json) = messages.recv() => {
                let outcome = console.on_json_received(&json);
                if let Some(tab) = Tab::for_outcome(outcome) {
                    console.render_mut().select(tab);
                    print!("{}", console.render().draw_active());
                }
            }
            Some(command) = commands.recv() => {
                let queued = match send_command(&outbound, command).await {
                    Ok(()) => {
                        info!(%command, "Command queued for serial link");
                        true
                    }
                    Err(e) => {
                        error!(%command, error = %e, "Failed to queue command");
                        false
                    }
                };
                let screen = console.render_mut();
                screen.record_command(command, queued);
                print!("{}", screen.draw_active());
            }
            else => break,
        }
    }

    info!("Message processor stopped");
}

async fn send_command(outbound: &mpsc::Sender<String>, command: Command) -> Result<()> {
    let line = serial::encode_line(&command.message()).context("Failed to encode command")?;
    outbound
        .send(line)
        .await
        .context("Serial link is not running")?;
    Ok(())
}

/// Read one operator command per line from stdin.
///
/// Runs on a plain thread: a blocking stdin read cannot be cancelled and
/// would otherwise hold up runtime shutdown.
fn read_operator_commands(tx: mpsc::Sender<Command>) -> Result<()> {
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if tx.blocking_send(command).is_err() {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Ignoring operator input"),
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout carries the display
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Sensor console starting");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path))?;
    info!(port = %config.serial.port, "Configuration loaded successfully");

    let capacity = config.console.channel_capacity;
    let (inbound_tx, inbound_rx) = mpsc::channel::<Value>(capacity);
    let (outbound_tx, outbound_rx) = mpsc::channel::<String>(capacity);
    let (command_tx, command_rx) = mpsc::channel::<Command>(capacity);

    let serial_handle = tokio::spawn(serial::run(config.serial.clone(), inbound_tx, outbound_rx));

    std::thread::spawn(move || {
        if let Err(e) = read_operator_commands(command_tx) {
            error!(error = %e, "Operator input failed");
        }
    });

    let mut processor_handle = tokio::spawn(process_messages(
        inbound_rx,
        command_rx,
        outbound_tx,
        config.console.status_history,
    ));

    info!("Console running. Type start, stop, restart or poweroff. Press Ctrl+C to stop.");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully");
        }
        _ = &mut processor_handle => {
            warn!("Message processor ended unexpectedly");
        }
    }

    serial_handle.abort();
    processor_handle.abort();

    info!("Sensor console stopped");
    Ok(())
}
