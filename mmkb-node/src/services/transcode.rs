use crate::error::TranscodeError;
use async_trait::async_trait;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::debug;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

pub fn waveform_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Mono 16 kHz 16-bit PCM file owned by one pipeline invocation. The file is
/// removed when the artifact is dropped.
#[derive(Debug)]
pub struct WaveformArtifact {
    path: TempPath,
}

impl WaveformArtifact {
    pub fn create_in(work_dir: &Path) -> std::io::Result<Self> {
        let path = tempfile::Builder::new()
            .prefix("mmkb-waveform-")
            .suffix(".wav")
            .tempfile_in(work_dir)?
            .into_temp_path();
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    fn name(&self) -> &str;

    /// Writes `input` to `output` as a canonical waveform, overwriting it.
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let tool = self.binary.display().to_string();
        let result = Command::new(&self.binary)
            .arg("-hide_banner")
            .args(["-loglevel", "error", "-y", "-i"])
            .arg(input)
            .args(["-vn", "-f", "wav", "-acodec", "pcm_s16le", "-ac", "1", "-ar"])
            .arg(TARGET_SAMPLE_RATE.to_string())
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(TranscodeError::Exit {
                tool,
                status: result.status,
                stderr: tail(&String::from_utf8_lossy(&result.stderr)),
            });
        }

        debug!("ffmpeg wrote {}", output.display());
        Ok(())
    }
}

/// In-process fallback: decodes PCM/float WAV input of any layout with `hound`,
/// downmixes to mono and resamples to 16 kHz.
pub struct WavResampler;

impl WavResampler {
    pub fn new() -> Self {
        Self
    }

    fn resample_file(input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let mut reader = WavReader::open(input)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let mono = downmix(&samples, spec.channels);
        let resampled = resample_linear(&mono, spec.sample_rate, TARGET_SAMPLE_RATE);

        let mut writer = WavWriter::create(output, waveform_spec())?;
        for sample in resampled {
            writer.write_sample(to_pcm16(sample))?;
        }
        writer.finalize()?;
        Ok(())
    }
}

impl Default for WavResampler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for WavResampler {
    fn name(&self) -> &str {
        "wav-resampler"
    }

    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let input = input.to_owned();
        let output = output.to_owned();
        tokio::task::spawn_blocking(move || WavResampler::resample_file(&input, &output))
            .await
            .map_err(|e| TranscodeError::Decode(format!("decoder task failed: {}", e)))?
    }
}

pub(crate) fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

pub(crate) fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).floor() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let position = i as f64 * ratio;
            let index = position.floor() as usize;
            let frac = (position - index as f64) as f32;
            let current = samples[index.min(last)];
            let next = samples[(index + 1).min(last)];
            current + (next - current) * frac
        })
        .collect()
}

fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Last few lines of a tool's stderr, enough for a diagnostic.
pub(crate) fn tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(3);
    lines[start..].join(" | ")
}
