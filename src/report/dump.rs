use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::audio::spectrum::{LogBase, Spectrum};

use super::Format;

pub const HEADER: &str = "Frequency (Hz)\tLevel (dB)";

#[derive(Debug, Serialize)]
struct Row {
    frequency: f64,
    /// Serialized as `null` for empty bins.
    level_db: f64,
}

/// Write every bin as a frequency/level pair, lowest frequency first.
/// The text layout is the one spectrum exports in audio editors use.
pub fn write_dump<W: Write>(
    out: &mut W,
    spectrum: &Spectrum,
    base: LogBase,
    format: Format,
) -> Result<()> {
    match format {
        Format::Text => {
            writeln!(out, "{}", HEADER)?;
            for (frequency, level) in spectrum.levels(base) {
                writeln!(out, "{}\t{}", frequency, level)?;
            }
        }
        Format::Json => {
            let rows: Vec<Row> = spectrum
                .levels(base)
                .map(|(frequency, level_db)| Row {
                    frequency,
                    level_db,
                })
                .collect();
            serde_json::to_writer(&mut *out, &rows)?;
            writeln!(out)?;
        }
    }
    log::debug!("Dumped {} bins", spectrum.len());
    Ok(())
}
