use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

use crate::config::{OutputFormat, PipelineConfig};
use crate::types::AudioData;

/// Failures while persisting an assembled part.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write WAV data: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program:?} exited with {status}: {stderr}")]
    Encoder {
        program: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Writes one normalized part to disk in the target format.
pub trait SegmentEncoder {
    /// File extension of the produced files, without the dot
    fn extension(&self) -> &'static str;

    fn encode(&self, audio: &AudioData, path: &Path) -> Result<(), EncodeError>;
}

/// Pick the encoder matching `config.output_format`.
pub fn encoder_for(config: &PipelineConfig) -> Box<dyn SegmentEncoder> {
    match config.output_format {
        OutputFormat::Wav => Box::new(WavEncoder),
        OutputFormat::Mp3 => Box::new(Mp3Encoder::new(config.bitrate_kbps, config.sample_rate)),
    }
}

/// 16-bit mono PCM WAV
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl SegmentEncoder for WavEncoder {
    fn extension(&self) -> &'static str {
        OutputFormat::Wav.extension()
    }

    fn encode(&self, audio: &AudioData, path: &Path) -> Result<(), EncodeError> {
        write_wav(audio, path)
    }
}

/// MP3 at a constant bitrate, produced by handing a temporary WAV to ffmpeg.
#[derive(Debug, Clone)]
pub struct Mp3Encoder {
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub program: PathBuf,
}

impl Mp3Encoder {
    pub fn new(bitrate_kbps: u32, sample_rate: u32) -> Self {
        Self {
            bitrate_kbps,
            sample_rate,
            program: PathBuf::from("ffmpeg"),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(input)
            .args(["-ac", "1", "-codec:a", "libmp3lame"])
            .arg("-ar")
            .arg(self.sample_rate.to_string())
            .arg("-b:a")
            .arg(format!("{}k", self.bitrate_kbps))
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl SegmentEncoder for Mp3Encoder {
    fn extension(&self) -> &'static str {
        OutputFormat::Mp3.extension()
    }

    fn encode(&self, audio: &AudioData, path: &Path) -> Result<(), EncodeError> {
        let pcm = tempfile::Builder::new()
            .prefix("coursegen-")
            .suffix(".wav")
            .tempfile()?;
        write_wav(audio, pcm.path())?;

        debug!(program = ?self.program, output = %path.display(), "running mp3 encoder");
        let output = self
            .command(pcm.path(), path)
            .output()
            .map_err(|source| EncodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(EncodeError::Encoder {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Write `audio` as 16-bit mono PCM at its own sample rate.
pub fn write_wav(audio: &AudioData, path: &Path) -> Result<(), EncodeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &audio.samples {
        writer.write_sample(to_i16(sample))?;
    }
    writer.finalize()?;
    Ok(())
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn wav_round_trips_length_and_rate() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("part.wav");
        let audio = AudioData::new(vec![0.0, 0.5, -0.5, 1.5], 22_050);
        WavEncoder.encode(&audio, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 22_050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.channels, 1);
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16_383, -16_383, i16::MAX]);
    }

    #[test]
    fn mp3_command_carries_bitrate_and_rate() {
        let encoder = Mp3Encoder::new(128, 22_050);
        let cmd = encoder.command(Path::new("in.wav"), Path::new("out.mp3"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.windows(2).any(|w| w == ["-b:a", "128k"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "22050"]));
        assert_eq!(args.last().map(String::as_str), Some("out.mp3"));
    }

    #[test]
    fn missing_encoder_program_is_reported() {
        let temp = tempdir().unwrap();
        let encoder =
            Mp3Encoder::new(128, 22_050).with_program(temp.path().join("no-such-ffmpeg"));
        let audio = AudioData::new(vec![0.0; 10], 22_050);
        let err = encoder
            .encode(&audio, &temp.path().join("out.mp3"))
            .unwrap_err();
        assert!(matches!(err, EncodeError::Spawn { .. }));
    }

    #[test]
    fn selects_encoder_from_config() {
        let mut config = PipelineConfig::default();
        assert_eq!(encoder_for(&config).extension(), "mp3");
        config.output_format = OutputFormat::Wav;
        assert_eq!(encoder_for(&config).extension(), "wav");
    }
}
