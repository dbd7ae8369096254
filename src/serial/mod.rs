//! # Serial Communication Module
//!
//! Reads sensor readings from the serial link on a dedicated thread.
//!
//! This module handles:
//! - Opening the serial port with a bounded read timeout
//! - Polling for waiting bytes, backing off briefly when idle
//! - Decoding and parsing `IR:` lines into the shared [`SampleBuffer`]
//! - Stopping permanently on the first I/O fault (no reconnection)

pub mod port_trait;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio_serial::SerialPort;
use tracing::{debug, error, info, trace, warn};

use crate::config::SerialConfig;
use crate::error::{MonitorError, Result};
use crate::telemetry::{decode_line, parse_line, Sample, SampleBuffer};
pub use port_trait::{LineDevice, SerialLineDevice};

/// Name given to the background reader thread
const READER_THREAD_NAME: &str = "serial-reader";

/// How often `join_timeout` checks whether the reader has exited
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Outcome of a single poll of the device
#[derive(Debug)]
pub enum ReadStep {
    /// A line was read and yielded a reading
    Sample(Sample),
    /// A line (or partial line) was read but carried no reading
    Skipped,
    /// No bytes were waiting
    Idle,
    /// The device failed; the read loop must stop
    Fault(io::Error),
}

/// Poll the device once
///
/// Never fails on content: undecodable or unrecognized lines become
/// [`ReadStep::Skipped`]. Only device errors produce [`ReadStep::Fault`].
pub fn read_step<D: LineDevice + ?Sized>(device: &mut D) -> ReadStep {
    match device.bytes_available() {
        Ok(0) => ReadStep::Idle,
        Ok(_) => match device.read_line() {
            Ok(Some(raw)) => {
                let line = decode_line(&raw);
                match parse_line(&line) {
                    Some(value) => ReadStep::Sample(value),
                    None => {
                        trace!("Ignoring line: {:?}", line);
                        ReadStep::Skipped
                    }
                }
            }
            Ok(None) => ReadStep::Skipped,
            Err(e) => ReadStep::Fault(e),
        },
        Err(e) => ReadStep::Fault(e),
    }
}

/// Shared view of whether the read loop is still alive
#[derive(Debug, Clone)]
pub struct ReaderStatus {
    running: Arc<AtomicBool>,
}

impl ReaderStatus {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn fixed(running: bool) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(running)),
        }
    }
}

/// Clears the running flag when the reader thread exits, even by panic
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Background serial reader feeding a [`SampleBuffer`]
///
/// The device handle moves into the reader thread and is released when that
/// thread exits, either after [`LineSource::close`] or after an I/O fault.
pub struct LineSource {
    device_path: String,
    stop: Arc<AtomicBool>,
    status: ReaderStatus,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSource")
            .field("device_path", &self.device_path)
            .field("running", &self.status.is_running())
            .finish_non_exhaustive()
    }
}

impl LineSource {
    /// Open the configured serial port and start reading
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be opened or the reader thread
    /// cannot be spawned. No thread is left running on error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ir_monitor::config::SerialConfig;
    /// use ir_monitor::serial::LineSource;
    /// use ir_monitor::telemetry::SampleBuffer;
    ///
    /// let buffer = SampleBuffer::new(600);
    /// let mut source = LineSource::start(&SerialConfig::default(), buffer.clone())?;
    /// // ... render buffer.snapshot() periodically ...
    /// source.close();
    /// source.join_timeout(std::time::Duration::from_secs(1));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn start(config: &SerialConfig, buffer: SampleBuffer) -> Result<Self> {
        let port = open_port(&config.port, config.baud_rate, config.timeout())?;
        info!(
            "Opened serial device {} at {} baud",
            config.port, config.baud_rate
        );

        Self::spawn(
            SerialLineDevice::new(port),
            &config.port,
            buffer,
            config.idle_backoff(),
        )
    }

    /// Start reading from an already opened device
    ///
    /// # Arguments
    ///
    /// * `device` - Line source moved into the reader thread
    /// * `device_path` - Name used in logs
    /// * `buffer` - Destination for parsed samples
    /// * `idle_backoff` - Sleep between polls when no bytes are waiting
    pub fn spawn<D: LineDevice + 'static>(
        device: D,
        device_path: &str,
        buffer: SampleBuffer,
        idle_backoff: Duration,
    ) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let stop = Arc::clone(&stop);
            let guard = RunningGuard(Arc::clone(&running));
            let path = device_path.to_string();

            thread::Builder::new()
                .name(READER_THREAD_NAME.to_string())
                .spawn(move || {
                    let _guard = guard;
                    run_read_loop(device, &buffer, &stop, idle_backoff);
                    debug!("Serial reader for {} exited", path);
                })?
        };

        Ok(Self {
            device_path: device_path.to_string(),
            stop,
            status: ReaderStatus { running },
            handle: Some(handle),
        })
    }

    /// Ask the read loop to stop at its next iteration
    ///
    /// The port is owned by the reader thread and closes when that thread
    /// exits. A read already blocked on the device is not interrupted, so
    /// exit can take up to the port's read timeout (`serial.timeout_ms`).
    /// Give [`LineSource::join_timeout`] at least that long.
    ///
    /// Safe to call more than once.
    pub fn close(&self) {
        if !self.stop.swap(true, Ordering::AcqRel) {
            debug!("Stop requested for serial reader on {}", self.device_path);
        }
    }

    /// Wait up to `grace` for the reader thread to exit
    ///
    /// Returns `true` once the thread has finished. On timeout the thread is
    /// left detached and `false` is returned.
    pub fn join_timeout(&mut self, grace: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + grace;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    "Serial reader on {} did not stop within {:?}",
                    self.device_path, grace
                );
                self.handle = Some(handle);
                return false;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        if handle.join().is_err() {
            warn!("Serial reader thread on {} panicked", self.device_path);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Cloneable handle for observing the reader from other threads
    pub fn status(&self) -> ReaderStatus {
        self.status.clone()
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

impl Drop for LineSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Poll the device until stopped or until it faults
fn run_read_loop<D: LineDevice>(
    mut device: D,
    buffer: &SampleBuffer,
    stop: &AtomicBool,
    idle_backoff: Duration,
) {
    while !stop.load(Ordering::Acquire) {
        match read_step(&mut device) {
            ReadStep::Sample(value) => buffer.push(value),
            ReadStep::Skipped => {}
            ReadStep::Idle => thread::sleep(idle_backoff),
            ReadStep::Fault(e) => {
                error!("Serial read failed, reader stopped: {}", e);
                break;
            }
        }
    }
}

/// Open a specific serial port as 8N1 with the given read timeout
fn open_port(path: &str, baud_rate: u32, timeout: Duration) -> Result<Box<dyn SerialPort>> {
    debug!("Trying to open serial port: {}", path);

    tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .timeout(timeout)
        .open()
        .map_err(|e| MonitorError::Serial(format!("Failed to open {}: {}", path, e)))
}
