use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::audio::peaks::{Peak, PeakReport};
use crate::audio::spectrum::LogBase;

use super::Format;

#[derive(Debug, Serialize)]
struct PeakLevel {
    frequency: f64,
    magnitude: f64,
    level_db: f64,
}

impl PeakLevel {
    fn new(peak: &Peak, base: LogBase) -> Self {
        Self {
            frequency: peak.frequency,
            magnitude: peak.magnitude,
            level_db: peak.level_db(base),
        }
    }
}

#[derive(Debug, Serialize)]
struct SnrSummary {
    first: PeakLevel,
    second: Option<PeakLevel>,
    snr_db: Option<f64>,
}

/// Print both peaks and the SNR estimate.
pub fn write_snr<W: Write>(
    out: &mut W,
    report: &PeakReport,
    base: LogBase,
    format: Format,
) -> Result<()> {
    match format {
        Format::Text => {
            writeln!(
                out,
                "First peak: {} dB {} Hz",
                report.first.level_db(base),
                report.first.frequency
            )?;
            match report.second {
                Some(second) => writeln!(
                    out,
                    "Second peak: {} dB {} Hz",
                    second.level_db(base),
                    second.frequency
                )?,
                None => writeln!(out, "Second peak: none")?,
            }
            match report.snr(base) {
                Some(snr) => writeln!(out, "SNR: {} dB", snr)?,
                None => writeln!(out, "SNR: undefined (no second peak)")?,
            }
        }
        Format::Json => {
            let summary = SnrSummary {
                first: PeakLevel::new(&report.first, base),
                second: report.second.as_ref().map(|p| PeakLevel::new(p, base)),
                snr_db: report.snr(base),
            };
            serde_json::to_writer_pretty(&mut *out, &summary)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
