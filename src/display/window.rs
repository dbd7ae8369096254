//! Native plot window redrawn on a fixed refresh period

use egui_plot::{Line, Plot, PlotBounds, PlotPoints};
use std::time::Duration;
use tracing::{info, warn};

use super::PlotFrame;
use crate::config::DisplayConfig;
use crate::serial::ReaderStatus;
use crate::telemetry::SampleBuffer;

/// eframe application showing the most recent samples
pub struct TelemetryWindow {
    buffer: SampleBuffer,
    status: ReaderStatus,
    device_path: String,
    refresh: Duration,
    reported_stop: bool,
}

impl TelemetryWindow {
    pub fn new(
        buffer: SampleBuffer,
        status: ReaderStatus,
        device_path: impl Into<String>,
        refresh: Duration,
    ) -> Self {
        Self {
            buffer,
            status,
            device_path: device_path.into(),
            refresh,
            reported_stop: false,
        }
    }

    fn status_line(&self, buffered: usize, latest: Option<f64>, running: bool) -> String {
        let state = if running { "reading" } else { "stopped" };
        let mut line = format!(
            "{} ({}) | {} / {} samples",
            self.device_path,
            state,
            buffered,
            self.buffer.capacity()
        );
        if let Some(value) = latest {
            line.push_str(&format!(" | latest {}", value));
        }
        line
    }
}

impl eframe::App for TelemetryWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let samples = self.buffer.snapshot();
        let plot_frame = PlotFrame::from_samples(&samples);
        let running = self.status.is_running();

        if !running && !self.reported_stop {
            warn!("Serial reader stopped, plot frozen at {} samples", samples.len());
            self.reported_stop = true;
        }

        let status = self.status_line(
            samples.len(),
            plot_frame.as_ref().and_then(PlotFrame::latest),
            running,
        );

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            Plot::new("ir_plot")
                .x_axis_label("Samples (most recent)")
                .y_axis_label("IR value")
                .allow_zoom(false)
                .allow_drag(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    if let Some(plot_frame) = &plot_frame {
                        plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                            [plot_frame.x_range.0, plot_frame.y_range.0],
                            [plot_frame.x_range.1, plot_frame.y_range.1],
                        ));
                        plot_ui.line(Line::new("IR", PlotPoints::from(plot_frame.points.clone())));
                    }
                });
        });

        ctx.request_repaint_after(self.refresh);
    }
}

/// Open the plot window and block until it is closed
///
/// # Errors
///
/// Returns error if the native window or graphics context cannot be created.
pub fn run(
    config: &DisplayConfig,
    buffer: SampleBuffer,
    status: ReaderStatus,
    device_path: &str,
) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 540.0])
            .with_min_inner_size([320.0, 200.0])
            .with_title(config.title.as_str()),
        ..Default::default()
    };

    let app = TelemetryWindow::new(buffer, status, device_path, config.refresh_period());
    info!("Opening plot window, refreshing every {:?}", config.refresh_period());

    eframe::run_native(
        &config.title,
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_for(capacity: usize, running: bool) -> TelemetryWindow {
        TelemetryWindow::new(
            SampleBuffer::new(capacity),
            ReaderStatus::fixed(running),
            "/dev/ttyACM0",
            Duration::from_millis(30),
        )
    }

    #[test]
    fn test_status_line_while_reading() {
        let window = window_for(600, true);

        assert_eq!(
            window.status_line(12, Some(4321.0), true),
            "/dev/ttyACM0 (reading) | 12 / 600 samples | latest 4321"
        );
    }

    #[test]
    fn test_status_line_when_stopped_and_empty() {
        let window = window_for(3, false);

        assert_eq!(
            window.status_line(0, None, false),
            "/dev/ttyACM0 (stopped) | 0 / 3 samples"
        );
    }
}
