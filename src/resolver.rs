//! Turns a sentence record into a playable unit for one translation language

use std::path::PathBuf;

use anyhow::Result;

use crate::audio::decoder::decode_clip;
use crate::audio::silence::silence;
use crate::config::PipelineConfig;
use crate::types::{
    AudioData, PieceKind, PlayableUnit, Resolution, SentenceRecord, SkipReason, UnitPiece,
};

/// Read-only access to the shared clip storage.
pub trait ClipStore {
    /// True when `clip` is non-empty and names an existing clip.
    fn exists(&self, clip: &str) -> bool;

    fn load(&self, clip: &str) -> Result<AudioData>;
}

/// Clips stored as files under one directory.
#[derive(Debug, Clone)]
pub struct FsClipStore {
    root: PathBuf,
}

impl FsClipStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, clip: &str) -> PathBuf {
        self.root.join(clip)
    }
}

impl ClipStore for FsClipStore {
    fn exists(&self, clip: &str) -> bool {
        !clip.is_empty() && self.path_of(clip).is_file()
    }

    fn load(&self, clip: &str) -> Result<AudioData> {
        decode_clip(self.path_of(clip))
    }
}

/// Silence gaps placed between the clips of a unit
#[derive(Debug, Clone, Copy)]
pub struct SilenceLayout {
    pub inter_clip_ms: u32,
    pub pre_translation_ms: u32,
    pub post_translation_ms: u32,
    pub sample_rate: u32,
}

impl From<&PipelineConfig> for SilenceLayout {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            inter_clip_ms: config.inter_clip_silence_ms,
            pre_translation_ms: config.pre_silence_ms,
            post_translation_ms: config.post_silence_ms,
            sample_rate: config.sample_rate,
        }
    }
}

pub struct SentenceResolver<'a, S: ClipStore> {
    store: &'a S,
    layout: SilenceLayout,
}

impl<'a, S: ClipStore> SentenceResolver<'a, S> {
    pub fn new(store: &'a S, layout: SilenceLayout) -> Self {
        Self { store, layout }
    }

    /// Resolve `sentence` for `language`.
    ///
    /// Every reference is checked before any clip is decoded, so a sentence
    /// missing a source clip is skipped identically for every language.
    pub fn resolve(&self, sentence: &SentenceRecord, language: &str) -> Resolution {
        if let Some(reason) = self.missing_source(sentence) {
            return Resolution::Skipped(reason);
        }
        let translation = match sentence.translation(language) {
            Some(translation) => translation,
            None => {
                return Resolution::Skipped(SkipReason::MissingTranslation {
                    language: language.to_string(),
                })
            }
        };
        if !self.store.exists(&translation.clip) {
            return Resolution::Skipped(SkipReason::MissingClip {
                clip: translation.clip.clone(),
            });
        }

        let layout = self.layout;
        let clips = [
            (PieceKind::SecondClip, sentence.second_clip.as_str()),
            (PieceKind::FirstClip, sentence.first_clip.as_str()),
            (PieceKind::TranslationClip, translation.clip.as_str()),
        ];
        let gaps = [
            layout.inter_clip_ms,
            layout.pre_translation_ms,
            layout.post_translation_ms,
        ];

        let mut pieces = Vec::with_capacity(clips.len() * 2);
        for ((kind, clip), gap_ms) in clips.into_iter().zip(gaps) {
            let audio = match self.store.load(clip) {
                Ok(audio) => audio,
                Err(err) => {
                    return Resolution::Skipped(SkipReason::UnreadableClip {
                        clip: clip.to_string(),
                        message: format!("{err:#}"),
                    })
                }
            };
            pieces.push(UnitPiece { kind, audio });
            pieces.push(UnitPiece {
                kind: PieceKind::Silence,
                audio: silence(gap_ms, layout.sample_rate),
            });
        }

        Resolution::Resolved(PlayableUnit { pieces })
    }

    /// First unusable source clip of `sentence`, if any.
    pub fn missing_source(&self, sentence: &SentenceRecord) -> Option<SkipReason> {
        [&sentence.first_clip, &sentence.second_clip]
            .into_iter()
            .find(|clip| !self.store.exists(clip))
            .map(|clip| SkipReason::MissingClip { clip: clip.clone() })
    }
}
