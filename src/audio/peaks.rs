use clap::ValueEnum;
use serde::Deserialize;

use super::error::AnalysisError;
use super::spectrum::{LogBase, Spectrum};

/// How bins are disqualified from being the second peak.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SecondPeak {
    /// Skip every bin whose magnitude equals the first peak's exactly.
    #[default]
    Magnitude,
    /// Skip only the first peak's own bin.
    Index,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub bin: usize,
    pub frequency: f64,
    pub magnitude: f64,
}

impl Peak {
    pub fn level_db(&self, base: LogBase) -> f64 {
        base.level_db(self.magnitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakReport {
    pub first: Peak,
    /// `None` when no bin other than the first peak carries energy.
    pub second: Option<Peak>,
}

impl PeakReport {
    /// `20 * log(first / second)`, undefined without a second peak.
    pub fn snr(&self, base: LogBase) -> Option<f64> {
        self.second
            .map(|second| 20.0 * base.log(self.first.magnitude / second.magnitude))
    }
}

/// Scan left to right for the largest bin, then for the runner-up.
///
/// Comparisons are strict, so the earliest bin wins ties. Both scans start
/// from a magnitude of zero: a zero-energy bin never becomes a peak.
pub fn find_peaks(spectrum: &Spectrum, policy: SecondPeak) -> Result<PeakReport, AnalysisError> {
    let magnitudes = spectrum.magnitudes();

    let first = scan(spectrum, &magnitudes, |_, _| true).ok_or(AnalysisError::NoSignal)?;

    let second = scan(spectrum, &magnitudes, |i, m| match policy {
        SecondPeak::Magnitude => m != first.magnitude,
        SecondPeak::Index => i != first.bin,
    });

    match second {
        Some(second) => log::debug!(
            "Peaks: bin {} ({:.2}Hz), bin {} ({:.2}Hz)",
            first.bin,
            first.frequency,
            second.bin,
            second.frequency
        ),
        None => log::warn!(
            "No second peak besides {:.2}Hz; SNR is undefined",
            first.frequency
        ),
    }

    Ok(PeakReport { first, second })
}

fn scan(
    spectrum: &Spectrum,
    magnitudes: &[f64],
    eligible: impl Fn(usize, f64) -> bool,
) -> Option<Peak> {
    let mut best: Option<Peak> = None;
    let mut max = 0.0;
    for (i, &m) in magnitudes.iter().enumerate() {
        if m > max && eligible(i, m) {
            max = m;
            best = Some(Peak {
                bin: i,
                frequency: spectrum.frequencies[i],
                magnitude: m,
            });
        }
    }
    best
}
