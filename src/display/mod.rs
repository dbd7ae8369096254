//! # Display Module
//!
//! Turns buffer snapshots into something a person can watch.
//!
//! This module handles:
//! - Laying out samples on a reversed index axis (newest at 0)
//! - Auto-ranging the value axis with proportional padding
//! - The plot window ([`window`]) and the log-only mode ([`headless`])

pub mod headless;
pub mod window;

use crate::telemetry::Sample;

/// Share of the value span added above and below the curve
pub const Y_PADDING_RATIO: f64 = 0.12;

/// Fixed padding added on top of the proportional one
pub const Y_PADDING_MIN: f64 = 1.0;

/// Everything needed to draw one refresh of the plot
#[derive(Debug, Clone, PartialEq)]
pub struct PlotFrame {
    /// `[x, y]` pairs, oldest first, x running from `-(n - 1)` to `0`
    pub points: Vec<[f64; 2]>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl PlotFrame {
    /// Lay out a snapshot for plotting
    ///
    /// Returns `None` for an empty snapshot; the previous view is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use ir_monitor::display::PlotFrame;
    ///
    /// let frame = PlotFrame::from_samples(&[10, 20, 30]).unwrap();
    /// assert_eq!(frame.points, vec![[-2.0, 10.0], [-1.0, 20.0], [0.0, 30.0]]);
    /// assert_eq!(frame.x_range, (-2.0, 0.0));
    /// ```
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let oldest = -((samples.len() - 1) as f64);
        let points: Vec<[f64; 2]> = samples
            .iter()
            .enumerate()
            .map(|(i, &value)| [oldest + i as f64, value as f64])
            .collect();

        // A single sample would give an empty x span
        let x_range = if samples.len() == 1 { (-1.0, 0.0) } else { (oldest, 0.0) };

        let (min, max) = samples
            .iter()
            .fold((Sample::MAX, Sample::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Some(Self {
            points,
            x_range,
            y_range: padded_range(min as f64, max as f64),
        })
    }

    /// Most recent sample value
    pub fn latest(&self) -> Option<f64> {
        self.points.last().map(|p| p[1])
    }
}

/// Value-axis range around `[min, max]`
///
/// A flat curve is first widened by one unit each way, then padded by
/// `span * 0.12 + 1` on both sides.
pub fn padded_range(mut min: f64, mut max: f64) -> (f64, f64) {
    if min == max {
        min -= 1.0;
        max += 1.0;
    }
    let pad = (max - min) * Y_PADDING_RATIO + Y_PADDING_MIN;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!((actual.0 - expected.0).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        assert!((actual.1 - expected.1).abs() < 1e-9, "{:?} != {:?}", actual, expected);
    }

    #[test]
    fn test_empty_snapshot_has_no_frame() {
        assert_eq!(PlotFrame::from_samples(&[]), None);
    }

    #[test]
    fn test_reversed_index_axis() {
        let frame = PlotFrame::from_samples(&[7, 8, 9, 10]).unwrap();
        let xs: Vec<f64> = frame.points.iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![-3.0, -2.0, -1.0, 0.0]);
        assert_eq!(frame.x_range, (-3.0, 0.0));
        assert_eq!(frame.latest(), Some(10.0));
    }

    #[test]
    fn test_single_sample_frame() {
        let frame = PlotFrame::from_samples(&[50]).unwrap();
        assert_eq!(frame.points, vec![[0.0, 50.0]]);
        assert_eq!(frame.x_range, (-1.0, 0.0));
        // 49..51 widened, pad = 2 * 0.12 + 1
        assert_close(frame.y_range, (47.76, 52.24));
    }

    #[test]
    fn test_padded_range_uses_span() {
        // span 100 -> pad 13
        assert_close(padded_range(100.0, 200.0), (87.0, 213.0));
    }

    #[test]
    fn test_padded_range_flat_curve() {
        assert_close(padded_range(0.0, 0.0), (-2.24, 2.24));
    }

    #[test]
    fn test_frame_range_tracks_min_and_max() {
        let frame = PlotFrame::from_samples(&[300, 100, 200]).unwrap();
        // span 200 -> pad 25
        assert_close(frame.y_range, (75.0, 325.0));
    }
}
