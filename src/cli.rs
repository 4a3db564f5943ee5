use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::audio::decode::Normalization;
use crate::audio::peaks::SecondPeak;
use crate::audio::spectrum::LogBase;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// Show the spectrum in an interactive window
    Plot,
    /// Print the two largest peaks and the SNR estimate
    Snr,
    /// Print every bin as a frequency/level pair
    Dump,
}

#[derive(Parser, Debug)]
#[command(name = "wavspec", about = "Spectral analysis for WAV files")]
pub struct Cli {
    /// Operations to run, in order
    #[arg(value_enum, required = true, num_args = 1..)]
    pub commands: Vec<Command>,

    /// WAV file to inspect (must be 16-bit PCM)
    pub file: PathBuf,

    /// Config file (defaults to ./wavspec.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sample divisor: legacy (2^15 + 1) or full-scale (2^15)
    #[arg(long, value_enum)]
    pub normalization: Option<Normalization>,

    /// Second peak exclusion: by equal magnitude or by bin index
    #[arg(long, value_enum)]
    pub second_peak: Option<SecondPeak>,

    /// Logarithm used for levels and SNR
    #[arg(long, value_enum)]
    pub log_base: Option<LogBase>,

    /// Emit snr/dump output as JSON
    #[arg(long)]
    pub json: bool,

    /// Plot window width
    #[arg(long, default_value_t = 800.0)]
    pub width: f32,

    /// Plot window height
    #[arg(long, default_value_t = 600.0)]
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_then_file() {
        let cli = Cli::try_parse_from(["wavspec", "snr", "dump", "plot", "tone.wav"]).unwrap();
        assert_eq!(cli.commands, vec![Command::Snr, Command::Dump, Command::Plot]);
        assert_eq!(cli.file, PathBuf::from("tone.wav"));
        assert!(cli.normalization.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn options_parse() {
        let cli = Cli::try_parse_from([
            "wavspec",
            "--normalization",
            "full-scale",
            "--second-peak",
            "index",
            "--log-base",
            "natural",
            "--json",
            "dump",
            "tone.wav",
        ])
        .unwrap();
        assert_eq!(cli.normalization, Some(Normalization::FullScale));
        assert_eq!(cli.second_peak, Some(SecondPeak::Index));
        assert_eq!(cli.log_base, Some(LogBase::Natural));
        assert!(cli.json);
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(Cli::try_parse_from(["wavspec", "spectrogram", "tone.wav"]).is_err());
    }

    #[test]
    fn requires_a_command() {
        assert!(Cli::try_parse_from(["wavspec", "tone.wav"]).is_err());
    }
}
