//! # IR Monitor Library
//!
//! Real-time viewer for IR readings streamed by a MAX30102 sensor board
//! over a serial port.
//!
//! A background thread reads `IR: <value>` lines from the serial device into
//! a bounded ring buffer; the display side periodically snapshots that
//! buffer and redraws a scrolling plot of the most recent readings.

pub mod config;
pub mod display;
pub mod error;
pub mod serial;
pub mod telemetry;
