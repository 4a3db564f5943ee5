use clap::ValueEnum;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::Deserialize;

use super::error::AnalysisError;

/// Logarithm used when converting magnitudes to levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LogBase {
    /// Decibels proper (`log10`).
    #[default]
    Ten,
    /// Natural log, matching the levels of older reports.
    Natural,
}

impl LogBase {
    pub fn log(self, x: f64) -> f64 {
        match self {
            LogBase::Ten => x.log10(),
            LogBase::Natural => x.ln(),
        }
    }

    /// Power-style level of a normalized magnitude: `10 * log(magnitude)`.
    pub fn level_db(self, magnitude: f64) -> f64 {
        10.0 * self.log(magnitude)
    }
}

/// Positive-frequency half of a windowed FFT.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    /// Normalized complex bins, `2 / halfN` applied
    pub bins: Vec<Complex<f64>>,
    /// Bin center frequencies (Hz), ascending from 0
    pub frequencies: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm()).collect()
    }

    /// `(frequency, level)` pairs in ascending frequency.
    pub fn levels(&self, base: LogBase) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .zip(self.bins.iter())
            .map(move |(&f, c)| (f, base.level_db(c.norm())))
    }
}

/// Symmetric Hamming window.
pub fn hamming_window(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos())
        .collect()
}

/// Hamming-window the whole buffer, transform it once and keep the
/// non-negative frequencies.
pub fn compute_spectrum(samples: &[f64], sample_rate: u32) -> Result<Spectrum, AnalysisError> {
    let n = samples.len();
    if n == 0 {
        return Err(AnalysisError::EmptyInput);
    }

    let window = hamming_window(n);
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let half = n.div_ceil(2);
    let scale = 2.0 / half as f64;
    buffer.truncate(half);
    for c in buffer.iter_mut() {
        *c *= scale;
    }

    let frequencies: Vec<f64> = (0..half)
        .map(|i| i as f64 * sample_rate as f64 / n as f64)
        .collect();

    log::debug!(
        "Spectrum: {} samples -> {} bins, resolution {:.4}Hz",
        n,
        half,
        sample_rate as f64 / n as f64
    );

    Ok(Spectrum {
        bins: buffer,
        frequencies,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sine(freq: f64, amplitude: f64, sample_rate: u32, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                amplitude * (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin()
            })
            .collect()
    }

    #[test]
    fn hamming_endpoints() {
        let w = hamming_window(5);
        assert!((w[0] - 0.08).abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!((w[4] - 0.08).abs() < 1e-12);
        assert_eq!(hamming_window(1), vec![1.0]);
        assert!(hamming_window(0).is_empty());
    }

    #[test]
    fn keeps_positive_half_with_fftfreq_spacing() {
        let spectrum = compute_spectrum(&sine(100.0, 0.5, 1000, 7), 1000).unwrap();
        assert_eq!(spectrum.len(), 4);
        let expected: Vec<f64> = (0..4).map(|i| i as f64 * 1000.0 / 7.0).collect();
        assert_eq!(spectrum.frequencies, expected);

        let spectrum = compute_spectrum(&sine(100.0, 0.5, 1000, 8), 1000).unwrap();
        assert_eq!(spectrum.len(), 4);
        assert_eq!(spectrum.frequencies, vec![0.0, 125.0, 250.0, 375.0]);
    }

    #[test]
    fn normalization_tracks_amplitude() {
        // Whole-bin sine: peak = A * coherent gain (0.54) * 2
        let spectrum = compute_spectrum(&sine(1000.0, 0.5, 8000, 8000), 8000).unwrap();
        let mags = spectrum.magnitudes();
        let peak = mags[1000];
        assert!((peak - 0.54).abs() < 0.01, "peak magnitude {peak}");
    }

    #[test]
    fn dc_input_lands_in_bin_zero() {
        let spectrum = compute_spectrum(&vec![0.25; 64], 64).unwrap();
        let mags = spectrum.magnitudes();
        let max_bin = mags
            .iter()
            .enumerate()
            .fold(0, |best, (i, &m)| if m > mags[best] { i } else { best });
        assert_eq!(max_bin, 0);
    }

    #[test]
    fn identical_input_gives_identical_spectrum() {
        let samples = sine(440.0, 0.8, 44100, 4410);
        let a = compute_spectrum(&samples, 44100).unwrap();
        let b = compute_spectrum(&samples, 44100).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.magnitudes(), b.magnitudes());
    }

    #[test]
    fn single_sample() {
        let spectrum = compute_spectrum(&[0.5], 8000).unwrap();
        assert_eq!(spectrum.len(), 1);
        assert_eq!(spectrum.frequencies, vec![0.0]);
        assert!((spectrum.bins[0].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(compute_spectrum(&[], 8000), Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn level_bases() {
        assert!((LogBase::Ten.level_db(0.1) + 10.0).abs() < 1e-12);
        assert!((LogBase::Natural.level_db(std::f64::consts::E) - 10.0).abs() < 1e-12);
        assert_eq!(LogBase::Ten.level_db(0.0), f64::NEG_INFINITY);
    }
}
