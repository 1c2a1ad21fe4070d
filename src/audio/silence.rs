//! Silence generation for the gaps inside a playable unit

use crate::types::AudioData;

/// Generates `duration_ms` of digital silence at `sample_rate`.
///
/// The sample count is rounded down, so the same duration always yields the
/// same number of samples for a given rate.
///
/// # Examples
/// ```
/// use coursegen::audio::silence::silence;
///
/// let gap = silence(1000, 22_050);
/// assert_eq!(gap.samples.len(), 22_050);
/// assert!(gap.samples.iter().all(|&s| s == 0.0));
/// ```
pub fn silence(duration_ms: u32, sample_rate: u32) -> AudioData {
    let num_samples = (duration_ms as u64 * sample_rate as u64 / 1000) as usize;
    AudioData::new(vec![0.0; num_samples], sample_rate)
}
