//! # IR Monitor
//!
//! Plot IR readings from a MAX30102 sensor board in real time.
//!
//! The board prints one `IR: <value>` line roughly every 10ms over its
//! serial port. This application reads those lines on a background thread
//! and redraws a scrolling plot of the most recent readings.

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use ir_monitor::config::Config;
use ir_monitor::display::{headless, window};
use ir_monitor::error::MonitorError;
use ir_monitor::serial::LineSource;
use ir_monitor::telemetry::SampleBuffer;

const USAGE: &str = "usage: ir-monitor [CONFIG] [--port PATH] [--headless]";

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Cli {
    config_path: Option<PathBuf>,
    port: Option<String>,
    headless: bool,
    help: bool,
}

impl Cli {
    fn parse<I>(args: I) -> std::result::Result<Self, MonitorError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Cli::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => cli.headless = true,
                "-h" | "--help" => cli.help = true,
                "-p" | "--port" => {
                    let port = args
                        .next()
                        .ok_or_else(|| MonitorError::Cli(format!("--port needs a value\n{}", USAGE)))?;
                    cli.port = Some(port);
                }
                flag if flag.starts_with('-') => {
                    return Err(MonitorError::Cli(format!("unknown option '{}'\n{}", flag, USAGE)));
                }
                path => {
                    if cli.config_path.is_some() {
                        return Err(MonitorError::Cli(format!(
                            "unexpected argument '{}'\n{}",
                            path, USAGE
                        )));
                    }
                    cli.config_path = Some(PathBuf::from(path));
                }
            }
        }

        Ok(cli)
    }

    /// Configuration from the given file (or defaults) with overrides applied
    fn config(&self) -> std::result::Result<Config, MonitorError> {
        let mut config = match &self.config_path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Config::load(path)?
            }
            None => Config::default(),
        };

        if let Some(port) = &self.port {
            config.serial.port = port.clone();
            config.validate()?;
        }

        Ok(config)
    }
}

/// Main entry point for IR Monitor
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (defaults when no file is given)
///    - Open the serial port and start the reader thread
///
/// 2. **Display**
///    - Plot window redrawn every `refresh_ms`, or
///    - Headless summaries every `log_interval_ms` until Ctrl+C
///
/// 3. **Shutdown**
///    - Stop the reader thread
///    - Wait up to `shutdown_grace_ms` for it to exit
///
/// # Errors
///
/// Returns error if:
/// - Arguments or configuration are invalid
/// - Serial port cannot be opened
/// - The plot window cannot be created
fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse(std::env::args().skip(1))?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }

    info!("IR Monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = cli.config()?;
    let buffer = SampleBuffer::new(config.buffer.capacity);
    let mut source = LineSource::start(&config.serial, buffer.clone())?;

    let outcome = if cli.headless {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| anyhow!("Failed to start runtime: {}", e))
            .map(|runtime| {
                runtime.block_on(headless::run(&config.display, buffer, source.status()));
            })
    } else {
        window::run(&config.display, buffer, source.status(), source.device_path())
            .map_err(|e| anyhow!("Plot window failed: {}", e))
    };

    info!("Exiting, stopping serial reader...");
    source.close();
    if !source.join_timeout(config.display.shutdown_grace()) {
        warn!("Serial reader still running at exit");
    }

    outcome
}
