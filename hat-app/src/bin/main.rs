// Rainbow HAT - Metronom und Piano auf Linux
//
// Startet Logging, lädt die Config, öffnet das Board (echt oder simuliert)
// und lässt beide Tasks laufen, bis SIGINT/SIGTERM oder ein fataler Fehler
// kommt.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rainbow_hat::{AppConfig, FileHandle, Shutdown, SimBoard, drive};

fn main() -> ExitCode {
    // RUST_LOG überschreibt das Standard-Level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Ein Token für Tasks und Signal-Handler
    let shutdown = Arc::new(Shutdown::new());
    let handler = Arc::clone(&shutdown);
    ctrlc::set_handler(move || handler.request()).context("Failed to install signal handler")?;

    let report = if config.simulate {
        info!("Running on simulated board");
        let board = SimBoard::new();
        drive(&board.handle(), &config, &shutdown)
    } else {
        let hat = FileHandle::open(&config.devices, None).with_context(|| {
            format!("Failed to open Rainbow HAT ({})", config.devices.leds.display())
        })?;
        info!("Rainbow HAT opened");
        drive(&hat, &config, &shutdown)
    };

    info!("Stopped: {report:?}");
    Ok(shutdown.exit_code())
}
