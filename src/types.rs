//! Core types for the coursegen assembly pipeline

use std::fmt;

/// Raw audio data representation (mono, f32 samples)
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 22050)
    pub sample_rate: u32,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in milliseconds; zero for an unset sample rate.
    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }
}

/// One course document: an ordered list of sentences in a source language.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDefinition {
    pub slug: String,
    pub name: String,
    pub language_code: String,
    pub version: String,
    pub sentences: Vec<SentenceRecord>,
}

/// A phrase with its two recorded repetitions and its translations.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRecord {
    pub text: String,
    /// First repetition clip file name (may be empty)
    pub first_clip: String,
    /// Second repetition clip file name (may be empty)
    pub second_clip: String,
    pub translations: Vec<TranslationEntry>,
}

impl SentenceRecord {
    pub fn translation(&self, language: &str) -> Option<&TranslationEntry> {
        self.translations.iter().find(|t| t.language == language)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationEntry {
    pub language: String,
    pub text: String,
    pub clip: String,
}

/// Which part of a playable unit a piece of audio came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    SecondClip,
    FirstClip,
    TranslationClip,
    Silence,
}

#[derive(Debug, Clone)]
pub struct UnitPiece {
    pub kind: PieceKind,
    pub audio: AudioData,
}

/// The ordered audio-plus-silence sequence derived from one resolvable
/// sentence for one translation language.
#[derive(Debug, Clone)]
pub struct PlayableUnit {
    pub pieces: Vec<UnitPiece>,
}

impl PlayableUnit {
    pub fn total_samples(&self) -> usize {
        self.pieces.iter().map(|p| p.audio.samples.len()).sum()
    }
}

/// Why a sentence was left out of a translation track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Clip reference is empty or the file does not exist
    MissingClip { clip: String },
    /// The sentence has no entry for the requested language
    MissingTranslation { language: String },
    /// The clip exists but could not be decoded
    UnreadableClip { clip: String, message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingClip { clip } if clip.is_empty() => {
                write!(f, "clip reference is empty")
            }
            SkipReason::MissingClip { clip } => write!(f, "clip file not found: {clip}"),
            SkipReason::MissingTranslation { language } => {
                write!(f, "no translation for language {language}")
            }
            SkipReason::UnreadableClip { clip, message } => {
                write!(f, "clip {clip} could not be decoded: {message}")
            }
        }
    }
}

/// Outcome of resolving one sentence for one translation language
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(PlayableUnit),
    Skipped(SkipReason),
}
