//! # Telemetry Module
//!
//! Sensor samples and where they live between the reader and the display.
//!
//! This module handles:
//! - Decoding raw serial lines (lossy UTF-8, trimmed)
//! - Extracting `IR:` readings from decoded lines
//! - Holding the most recent readings in a bounded, shared ring buffer

pub mod buffer;
pub mod parser;

pub use buffer::SampleBuffer;
pub use parser::{decode_line, parse_line, Sample};
