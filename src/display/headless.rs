//! Log-only display for machines without a window system
//!
//! Periodically logs a summary of the buffered samples until Ctrl+C.

use std::future::Future;
use tokio::time::interval;
use tracing::{info, warn};

use crate::config::DisplayConfig;
use crate::serial::ReaderStatus;
use crate::telemetry::{Sample, SampleBuffer};

/// Statistics over one buffer snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub buffered: usize,
    pub latest: Sample,
    pub min: Sample,
    pub max: Sample,
}

impl Summary {
    /// Summarize a snapshot, `None` if it is empty
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let latest = *samples.last()?;
        let (min, max) = samples
            .iter()
            .fold((latest, latest), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Some(Self {
            buffered: samples.len(),
            latest,
            min,
            max,
        })
    }
}

/// Log summaries until Ctrl+C is received
pub async fn run(config: &DisplayConfig, buffer: SampleBuffer, status: ReaderStatus) {
    run_until(config, buffer, status, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down...");
    })
    .await;
}

/// Log summaries until `shutdown` completes
///
/// Returns the number of summaries logged.
pub async fn run_until<F>(
    config: &DisplayConfig,
    buffer: SampleBuffer,
    status: ReaderStatus,
    shutdown: F,
) -> u64
where
    F: Future<Output = ()>,
{
    let mut ticker = interval(config.log_interval());
    let mut reported_stop = false;
    let mut reports: u64 = 0;

    tokio::pin!(shutdown);

    info!("Logging IR summary every {:?}", config.log_interval());
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match Summary::from_samples(&buffer.snapshot()) {
                    Some(s) => info!(
                        "IR latest={} min={} max={} buffered={} total={}",
                        s.latest, s.min, s.max, s.buffered, buffer.total_pushed()
                    ),
                    None => info!("No IR samples yet"),
                }
                reports += 1;

                if !reported_stop && !status.is_running() {
                    warn!("Serial reader stopped, no further samples will arrive");
                    reported_stop = true;
                }
            }

            _ = &mut shutdown => break,
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port_trait::mocks::ScriptedDevice;
    use crate::serial::LineSource;
    use std::time::Duration;

    #[test]
    fn test_summary_of_empty_snapshot() {
        assert_eq!(Summary::from_samples(&[]), None);
    }

    #[test]
    fn test_summary_values() {
        let summary = Summary::from_samples(&[40, 10, 90, 25]).unwrap();
        assert_eq!(
            summary,
            Summary {
                buffered: 4,
                latest: 25,
                min: 10,
                max: 90,
            }
        );
    }

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let config = DisplayConfig {
            log_interval_ms: 10,
            ..DisplayConfig::default()
        };
        let buffer = SampleBuffer::new(8);
        buffer.push(5);

        let mut source = LineSource::spawn(
            ScriptedDevice::new(),
            "mock",
            buffer.clone(),
            Duration::from_millis(1),
        )
        .unwrap();

        let reports = run_until(
            &config,
            buffer,
            source.status(),
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await;

        // First tick fires immediately
        assert!(reports >= 1);

        source.close();
        assert!(source.join_timeout(Duration::from_secs(5)));
    }
}
