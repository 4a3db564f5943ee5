#![cfg_attr(not(feature = "plot"), allow(dead_code))]

use crate::audio::peaks::PeakReport;
use crate::audio::spectrum::{LogBase, Spectrum};

/// Plot window size in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
}

/// `[log10(frequency), level]` points. The DC bin and empty bins are
/// skipped since neither has a place on a log-log plot.
pub fn plot_points(spectrum: &Spectrum, base: LogBase) -> Vec<[f64; 2]> {
    spectrum
        .levels(base)
        .filter(|&(f, level)| f > 0.0 && level.is_finite())
        .map(|(f, level)| [f.log10(), level])
        .collect()
}

/// Marker positions for the detected peaks.
pub fn peak_markers(report: &PeakReport, base: LogBase) -> Vec<[f64; 2]> {
    std::iter::once(report.first)
        .chain(report.second)
        .filter(|p| p.frequency > 0.0)
        .map(|p| [p.frequency.log10(), p.level_db(base)])
        .collect()
}

#[cfg(feature = "plot")]
pub use window::show;

#[cfg(feature = "plot")]
mod window {
    use anyhow::Result;
    use eframe::egui;
    use egui::plot::{Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

    use super::WindowSize;

    /// Open the spectrum window and block until the user closes it.
    pub fn show(title: &str, points: Vec<[f64; 2]>, peaks: Vec<[f64; 2]>, size: WindowSize) -> Result<()> {
        let options = eframe::NativeOptions {
            initial_window_size: Some(egui::vec2(size.width, size.height)),
            ..Default::default()
        };
        let heading = title.to_string();

        log::info!("Opening plot window ({} points)", points.len());
        eframe::run_native(
            title,
            options,
            Box::new(move |_cc| Box::new(SpectrumApp { heading, points, peaks })),
        )
        .map_err(|e| anyhow::anyhow!("Plot window failed: {e}"))
    }

    struct SpectrumApp {
        heading: String,
        points: Vec<[f64; 2]>,
        peaks: Vec<[f64; 2]>,
    }

    impl eframe::App for SpectrumApp {
        fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading(self.heading.as_str());
                ui.label("x: log10(frequency / Hz), y: level (dB)");
                Plot::new("spectrum")
                    .legend(Legend::default())
                    .label_formatter(|_name: &str, value: &PlotPoint| {
                        format!("{:.1} Hz\n{:.2} dB", 10f64.powf(value.x), value.y)
                    })
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new(PlotPoints::new(self.points.clone())).name("level"));
                        if !self.peaks.is_empty() {
                            plot_ui.points(
                                Points::new(PlotPoints::new(self.peaks.clone()))
                                    .shape(MarkerShape::Circle)
                                    .radius(5.0)
                                    .name("peaks"),
                            );
                        }
                    });
            });
        }
    }
}
