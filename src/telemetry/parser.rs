//! # Sample Line Parser
//!
//! Decodes serial lines of the form `IR: 123456` into samples.

use regex::Regex;
use std::sync::LazyLock;

/// One IR reading as reported by the sensor board
pub type Sample = u64;

/// Prefix every sample line must start with
pub const IR_PREFIX: &str = "IR:";

static IR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"IR:\s*([0-9]+)").expect("IR pattern is valid"));

/// Decode raw line bytes into text
///
/// Invalid UTF-8 sequences are dropped rather than replaced, and surrounding
/// whitespace (including the `\r\n` terminator) is trimmed.
///
/// # Examples
///
/// ```
/// use ir_monitor::telemetry::decode_line;
///
/// assert_eq!(decode_line(b"IR: 42\r\n"), "IR: 42");
/// assert_eq!(decode_line(b"IR:\xff7\n"), "IR:7");
/// ```
pub fn decode_line(raw: &[u8]) -> String {
    let text: String = raw.utf8_chunks().map(|chunk| chunk.valid()).collect();
    text.trim().to_string()
}

/// Extract a sample from a decoded line
///
/// The line must start with `IR:`. The value is the first run of digits that
/// follows an `IR:` marker (optionally separated by whitespace). Anything else,
/// including values too large for a [`Sample`], yields `None`.
///
/// # Examples
///
/// ```
/// use ir_monitor::telemetry::parse_line;
///
/// assert_eq!(parse_line("IR: 123"), Some(123));
/// assert_eq!(parse_line("IR:45"), Some(45));
/// assert_eq!(parse_line("IR:abc"), None);
/// assert_eq!(parse_line("noise IR:99"), None);
/// ```
pub fn parse_line(line: &str) -> Option<Sample> {
    if !line.starts_with(IR_PREFIX) {
        return None;
    }

    let captures = IR_PATTERN.captures(line)?;
    captures.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_space() {
        assert_eq!(parse_line("IR: 123"), Some(123));
    }

    #[test]
    fn test_parse_without_space() {
        assert_eq!(parse_line("IR:45"), Some(45));
    }

    #[test]
    fn test_parse_tab_separated() {
        assert_eq!(parse_line("IR:\t7"), Some(7));
    }

    #[test]
    fn test_parse_no_digits() {
        assert_eq!(parse_line("IR:abc"), None);
        assert_eq!(parse_line("IR:"), None);
        assert_eq!(parse_line("IR: "), None);
    }

    #[test]
    fn test_parse_requires_prefix_at_line_start() {
        assert_eq!(parse_line("junk"), None);
        assert_eq!(parse_line("noise IR:99"), None);
        assert_eq!(parse_line("ir: 5"), None);
        assert_eq!(parse_line("RED: 5"), None);
    }

    #[test]
    fn test_parse_takes_first_run_of_digits() {
        assert_eq!(parse_line("IR: 12 34"), Some(12));
        assert_eq!(parse_line("IR:77abc"), Some(77));
    }

    #[test]
    fn test_parse_searches_past_unparseable_marker() {
        // Prefix check passes, pattern then matches the later marker
        assert_eq!(parse_line("IR:x IR:5"), Some(5));
    }

    #[test]
    fn test_parse_negative_sign_is_not_digits() {
        assert_eq!(parse_line("IR:-5"), None);
    }

    #[test]
    fn test_parse_only_ascii_digits() {
        // Arabic-Indic digits are not sensor output
        assert_eq!(parse_line("IR:\u{661}\u{662}"), None);
        assert_eq!(parse_line("IR: \u{661}2"), None);
    }

    #[test]
    fn test_parse_overflow_yields_none() {
        assert_eq!(parse_line("IR: 99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_max_sensor_value() {
        // MAX30102 IR channel is 18 bits wide
        assert_eq!(parse_line("IR: 262143"), Some(0x03FFFF));
    }

    #[test]
    fn test_decode_trims_line_endings() {
        assert_eq!(decode_line(b"IR: 42\r\n"), "IR: 42");
        assert_eq!(decode_line(b"  IR:1  \n"), "IR:1");
        assert_eq!(decode_line(b"\r\n"), "");
    }

    #[test]
    fn test_decode_drops_invalid_utf8() {
        assert_eq!(decode_line(b"I\xffR: 9\n"), "IR: 9");
        assert_eq!(decode_line(b"\xfe\xff"), "");
    }

    #[test]
    fn test_decode_keeps_valid_multibyte() {
        assert_eq!(decode_line("IR值: 3".as_bytes()), "IR值: 3");
    }

    #[test]
    fn test_mixed_stream_accepts_only_anchored_lines() {
        let lines = ["junk", "IR:10", "IR: 20", "noise IR:99"];
        let samples: Vec<Sample> = lines.iter().filter_map(|l| parse_line(l)).collect();
        assert_eq!(samples, vec![10, 20]);
    }

    #[test]
    fn test_firmware_output_round_trip() {
        // Firmware writes "IR: %lu\r\n"
        let raw = format!("IR: {}\r\n", 131072u32);
        assert_eq!(parse_line(&decode_line(raw.as_bytes())), Some(131072));
    }
}
