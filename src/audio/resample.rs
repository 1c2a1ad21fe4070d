use anyhow::{ensure, Result};

use crate::types::AudioData;

/// Bring `audio` to `target_rate`, leaving it untouched when it already
/// matches.
pub fn normalize_rate(audio: AudioData, target_rate: u32) -> Result<AudioData> {
    if audio.sample_rate == target_rate {
        return Ok(audio);
    }
    let samples = linear_resample(&audio.samples, audio.sample_rate, target_rate)?;
    Ok(AudioData::new(samples, target_rate))
}

/// Linearly resample `samples` from `source_rate` to `target_rate`.
pub fn linear_resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    ensure!(source_rate > 0, "source sample rate must be positive");
    ensure!(target_rate > 0, "target sample rate must be positive");
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    let step = source_rate as f64 / target_rate as f64;
    let output_len = (samples.len() as u64 * target_rate as u64).div_ceil(source_rate as u64);
    let last = samples.len() - 1;
    let output = (0..output_len as usize)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let t = (position - left as f64) as f32;
            samples[left] + (samples[right] - samples[left]) * t
        })
        .collect();
    Ok(output)
}
