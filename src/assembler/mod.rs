//! Per-language accumulation of playable units into size-bounded parts

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::audio::encoder::SegmentEncoder;
use crate::audio::resample::normalize_rate;
use crate::types::{AudioData, PlayableUnit};

/// Deterministic output name of one part.
pub fn part_file_name(slug: &str, language: &str, part: usize, extension: &str) -> String {
    format!("{slug}_{language}_{part}_course.{extension}")
}

/// An accumulating audio buffer and the sentences folded into it.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    samples: Vec<f32>,
    phrases: Vec<usize>,
}

impl Segment {
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// Sentence indices in fold order
    pub fn phrases(&self) -> &[usize] {
        &self.phrases
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    fn duration_ms(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 * 1000.0 / sample_rate as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Empty,
    Accumulating,
}

/// Every part of one (course, translation language) pair, in sentence order.
#[derive(Debug, Clone)]
pub struct TranslationTrack {
    language: String,
    page_size: usize,
    sample_rate: u32,
    segments: Vec<Segment>,
    phrase_count: usize,
}

impl TranslationTrack {
    pub fn new(language: impl Into<String>, page_size: usize, sample_rate: u32) -> Self {
        Self {
            language: language.into(),
            page_size: page_size.max(1),
            sample_rate,
            segments: vec![Segment::default()],
            phrase_count: 0,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn phrase_count(&self) -> usize {
        self.phrase_count
    }

    pub fn state(&self) -> TrackState {
        if self.phrase_count == 0 {
            TrackState::Empty
        } else {
            TrackState::Accumulating
        }
    }

    /// All segments, including the open one (which may be empty).
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Append the unit for sentence `sentence_index` to the open segment.
    ///
    /// Pieces are appended sample for sample at the track rate. After the
    /// phrase counter reaches a multiple of the page size a fresh segment is
    /// opened, so boundaries depend on phrase count only.
    pub fn fold(&mut self, sentence_index: usize, unit: PlayableUnit) -> Result<()> {
        let sample_rate = self.sample_rate;
        let segment = self.current_mut();
        segment.samples.reserve(unit.total_samples());
        for piece in unit.pieces {
            let audio = normalize_rate(piece.audio, sample_rate)
                .with_context(|| format!("failed to resample {:?} piece", piece.kind))?;
            segment.samples.extend_from_slice(&audio.samples);
        }
        segment.phrases.push(sentence_index);

        self.phrase_count += 1;
        debug!(
            language = %self.language,
            sentence = sentence_index,
            phrases = self.phrase_count,
            "folded phrase"
        );
        if self.phrase_count % self.page_size == 0 {
            self.segments.push(Segment::default());
        }
        Ok(())
    }

    /// Encode every segment longer than `min_segment_ms` into `out_dir`.
    ///
    /// Part numbers start at 1 and count written parts only.
    pub fn finalize(
        self,
        slug: &str,
        out_dir: &Path,
        encoder: &dyn SegmentEncoder,
        min_segment_ms: u32,
    ) -> Result<FinalizedTrack> {
        let mut parts = Vec::new();
        for segment in self.segments {
            let duration_ms = segment.duration_ms(self.sample_rate);
            if duration_ms <= f64::from(min_segment_ms) {
                continue;
            }
            let index = parts.len() + 1;
            let file_name = part_file_name(slug, &self.language, index, encoder.extension());
            let path = out_dir.join(&file_name);
            let audio = AudioData::new(segment.samples, self.sample_rate);
            encoder
                .encode(&audio, &path)
                .with_context(|| format!("failed to encode part {index} to {:?}", path))?;
            info!(
                language = %self.language,
                part = index,
                phrases = segment.phrases.len(),
                seconds = duration_ms / 1000.0,
                "wrote {}",
                file_name
            );
            parts.push(PartFile {
                index,
                file_name,
                path,
                phrases: segment.phrases,
                duration_ms,
            });
        }

        Ok(FinalizedTrack {
            language: self.language,
            phrase_count: self.phrase_count,
            parts,
        })
    }

    fn current_mut(&mut self) -> &mut Segment {
        if self.segments.is_empty() {
            self.segments.push(Segment::default());
        }
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }
}

/// A track after encoding; no further folding is possible.
#[derive(Debug, Clone)]
pub struct FinalizedTrack {
    pub language: String,
    pub phrase_count: usize,
    pub parts: Vec<PartFile>,
}

impl FinalizedTrack {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PartFile {
    /// 1-based part number
    pub index: usize,
    pub file_name: String,
    pub path: PathBuf,
    pub phrases: Vec<usize>,
    pub duration_ms: f64,
}
