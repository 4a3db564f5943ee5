use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{
    CodecType, DecoderOptions, CODEC_TYPE_NULL, CODEC_TYPE_PCM_S16BE, CODEC_TYPE_PCM_S16LE,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::error::AnalysisError;

/// Divisor applied to signed 16-bit samples.
///
/// `Legacy` divides by 2^15 + 1, which keeps the historical output of the
/// analysis tool bit-for-bit. `FullScale` uses the conventional 2^15.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    #[default]
    Legacy,
    FullScale,
}

impl Normalization {
    pub fn divisor(self) -> f64 {
        match self {
            Normalization::Legacy => 32769.0,
            Normalization::FullScale => 32768.0,
        }
    }

    pub fn normalize(self, sample: i16) -> f64 {
        sample as f64 / self.divisor()
    }
}

/// Mono samples decoded from a 16-bit PCM file.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
    /// Channel count before downmixing.
    pub channels: usize,
    /// Frame count declared by the file header, if any.
    pub declared_frames: Option<u64>,
}

impl AudioData {
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

fn is_pcm_s16(codec: CodecType) -> bool {
    codec == CODEC_TYPE_PCM_S16LE || codec == CODEC_TYPE_PCM_S16BE
}

fn codec_name(codec: CodecType) -> String {
    symphonia::default::get_codecs()
        .get_codec(codec)
        .map(|d| d.short_name.to_string())
        .unwrap_or_else(|| "unknown codec".to_string())
}

pub fn decode_wav(path: &Path, normalization: Normalization) -> Result<AudioData, AnalysisError> {
    let file = std::fs::File::open(path).map_err(|source| AnalysisError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AnalysisError::NoAudioTrack)?;

    let track_id = track.id;
    let params = track.codec_params.clone();

    if !is_pcm_s16(params.codec) {
        return Err(AnalysisError::UnsupportedFormat {
            codec: codec_name(params.codec),
            bits: params.bits_per_sample,
        });
    }

    let channels = params.channels.map_or(1, |c| c.count());
    let sample_rate = params.sample_rate.ok_or(AnalysisError::UnknownSampleRate)?;

    let mut decoder =
        symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

    let mut all_samples: Vec<f64> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        // A corrupt packet aborts the whole analysis.
        let decoded = decoder.decode(&packet)?;

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<i16>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Downmix to mono
        if channels == 1 {
            all_samples.extend(samples.iter().map(|&s| normalization.normalize(s)));
        } else {
            for frame_samples in samples.chunks(channels) {
                let mono: f64 = frame_samples
                    .iter()
                    .map(|&s| normalization.normalize(s))
                    .sum::<f64>()
                    / channels as f64;
                all_samples.push(mono);
            }
        }
    }

    let audio = AudioData {
        samples: all_samples,
        sample_rate,
        channels,
        declared_frames: params.n_frames,
    };

    if let Some(declared) = audio.declared_frames {
        if declared != audio.samples.len() as u64 {
            log::warn!(
                "Header declares {} frames but {} were decoded",
                declared,
                audio.samples.len()
            );
        }
    }

    log::info!(
        "Decoded audio: {} samples, {}Hz, {} channel(s), {:.3}s",
        audio.samples.len(),
        audio.sample_rate,
        audio.channels,
        audio.duration()
    );

    Ok(audio)
}
