mod audio;
mod cli;
mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use audio::decode::Normalization;
use audio::peaks::SecondPeak;
use audio::spectrum::{LogBase, Spectrum};
use cli::{Cli, Command};
use report::Format;

/// Settings shared by every command of one invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct AnalysisOptions {
    normalization: Normalization,
    second_peak: SecondPeak,
    log_base: LogBase,
    format: Format,
}

impl AnalysisOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            normalization: cli.normalization.unwrap_or_default(),
            second_peak: cli.second_peak.unwrap_or_default(),
            log_base: cli.log_base.unwrap_or_default(),
            format: if cli.json { Format::Json } else { Format::Text },
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                apply_config(&mut cli, cfg);
            }
            // An explicit --config must be usable; discovered ones are optional
            Err(err) if cli.config.is_some() => return Err(err),
            Err(err) => log::warn!("Ignoring config {}: {:#}", path.display(), err),
        }
    }

    let options = AnalysisOptions::from_cli(&cli);
    log::info!("Input: {}", cli.file.display());
    log::debug!("Options: {:?}", options);

    // 1. Decode audio
    let audio = audio::decode::decode_wav(&cli.file, options.normalization)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    // 2. Spectrum
    let spectrum = audio::spectrum::compute_spectrum(&audio.samples, audio.sample_rate)
        .context("Failed to compute spectrum")?;
    log::info!(
        "Spectrum: {} bins, {:.3}Hz resolution",
        spectrum.len(),
        audio.sample_rate as f64 / audio.samples.len() as f64
    );

    // 3. Commands, in the order given
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for command in &cli.commands {
        run_command(*command, &cli, &spectrum, &options, &mut out)?;
    }
    out.flush()?;

    Ok(())
}

/// Config values apply only when the CLI left the setting at its default.
fn apply_config(cli: &mut Cli, cfg: config::Config) {
    if cli.normalization.is_none() { cli.normalization = Some(cfg.analysis.normalization); }
    if cli.second_peak.is_none() { cli.second_peak = Some(cfg.analysis.second_peak); }
    if cli.log_base.is_none() { cli.log_base = Some(cfg.analysis.log_base); }
    if !cli.json { cli.json = cfg.output.json; }
    if cli.width == config::default_width() { cli.width = cfg.plot.width; }
    if cli.height == config::default_height() { cli.height = cfg.plot.height; }
}

fn run_command<W: Write>(
    command: Command,
    cli: &Cli,
    spectrum: &Spectrum,
    options: &AnalysisOptions,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Plot => {
            // Flush reports printed so far before blocking on the window
            out.flush()?;
            plot(cli, spectrum, options)
        }
        Command::Snr => {
            let peaks = audio::peaks::find_peaks(spectrum, options.second_peak)?;
            report::snr::write_snr(out, &peaks, options.log_base, options.format)
        }
        Command::Dump => report::dump::write_dump(out, spectrum, options.log_base, options.format),
    }
}

#[cfg(feature = "plot")]
fn plot(cli: &Cli, spectrum: &Spectrum, options: &AnalysisOptions) -> Result<()> {
    use report::plot::{peak_markers, plot_points, WindowSize};

    let points = plot_points(spectrum, options.log_base);
    // Silent input still gets a window, just without markers
    let peaks = match audio::peaks::find_peaks(spectrum, options.second_peak) {
        Ok(report) => peak_markers(&report, options.log_base),
        Err(err) => {
            log::warn!("No peaks to mark: {}", err);
            Vec::new()
        }
    };
    let title = cli
        .file
        .file_name()
        .map(|name| format!("Spectrum of {}", name.to_string_lossy()))
        .unwrap_or_else(|| "Spectrum".to_string());

    report::plot::show(
        &title,
        points,
        peaks,
        WindowSize {
            width: cli.width,
            height: cli.height,
        },
    )
}

#[cfg(not(feature = "plot"))]
fn plot(_cli: &Cli, _spectrum: &Spectrum, _options: &AnalysisOptions) -> Result<()> {
    anyhow::bail!(
        "Plotting requires the 'plot' feature. \
         Rebuild with: cargo build --features plot"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode::tests::write_pcm16;

    fn tone(freq: f64, rate: u32, len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f64 / rate as f64;
                (16000.0 * (2.0 * std::f64::consts::PI * freq * t).sin()) as i16
            })
            .collect()
    }

    fn run(args: &[&str], path: &std::path::Path) -> String {
        let mut argv: Vec<&str> = vec!["wavspec"];
        argv.extend_from_slice(args);
        let file = path.to_string_lossy().into_owned();
        argv.push(&file);
        let cli = Cli::try_parse_from(argv).unwrap();
        let options = AnalysisOptions::from_cli(&cli);

        let audio = audio::decode::decode_wav(&cli.file, options.normalization).unwrap();
        let spectrum = audio::spectrum::compute_spectrum(&audio.samples, audio.sample_rate).unwrap();
        let mut out = Vec::new();
        for command in &cli.commands {
            run_command(*command, &cli, &spectrum, &options, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn snr_then_dump_in_order() {
        let path = write_pcm16("pipeline", 8000, 1, &tone(440.0, 8000, 8000));
        let text = run(&["snr", "dump"], &path);
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("First peak: "));
        assert!(lines[0].ends_with(" 440 Hz"), "{}", lines[0]);
        assert!(lines[1].starts_with("Second peak: "));
        assert!(lines[2].starts_with("SNR: "));
        assert_eq!(lines[3], report::dump::HEADER);
        // 8000 samples -> 4000 bins
        assert_eq!(lines.len(), 4 + 4000);
        assert_eq!(lines[4 + 440].split('\t').next(), Some("440"));
    }

    #[test]
    fn json_snr() {
        let path = write_pcm16("pipeline-json", 8000, 1, &tone(1000.0, 8000, 4000));
        let text = run(&["--json", "snr"], &path);
        std::fs::remove_file(&path).ok();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["first"]["frequency"], 1000.0);
        assert!(value["snr_db"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn config_fills_unset_options() {
        let mut cli = Cli::try_parse_from(["wavspec", "--log-base", "ten", "snr", "x.wav"]).unwrap();
        let mut cfg = config::Config::default();
        cfg.analysis.log_base = LogBase::Natural;
        cfg.analysis.second_peak = SecondPeak::Index;
        cfg.plot.width = 1024.0;
        cfg.output.json = true;

        apply_config(&mut cli, cfg);
        let options = AnalysisOptions::from_cli(&cli);

        assert_eq!(options.log_base, LogBase::Ten);
        assert_eq!(options.second_peak, SecondPeak::Index);
        assert_eq!(options.normalization, Normalization::Legacy);
        assert_eq!(options.format, Format::Json);
        assert_eq!(cli.width, 1024.0);
    }
}
