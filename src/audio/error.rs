use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to open audio file {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("no audio tracks found")]
    NoAudioTrack,

    #[error("unknown sample rate")]
    UnknownSampleRate,

    /// Only 16-bit signed PCM input is analyzed.
    #[error("unsupported sample format: {codec} ({}); only 16-bit PCM is supported", describe_bits(.bits))]
    UnsupportedFormat { codec: String, bits: Option<u32> },

    #[error("audio file contains no samples")]
    EmptyInput,

    #[error("spectrum has no non-zero bins (silent input)")]
    NoSignal,
}

fn describe_bits(bits: &Option<u32>) -> String {
    match bits {
        Some(bits) => format!("{bits}-bit"),
        None => "unknown bit depth".to_string(),
    }
}
