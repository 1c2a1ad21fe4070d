//! Drives resolver and assembler over every course in the languages directory

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::assembler::{FinalizedTrack, TranslationTrack};
use crate::audio::encoder::SegmentEncoder;
use crate::catalog::{Catalog, CourseCatalogEntry};
use crate::config::{AppPaths, PipelineConfig, AUDIO_SUBDIR};
use crate::course::{discover_course_files, translation_languages, CourseError, CourseFile};
use crate::resolver::{ClipStore, FsClipStore, SentenceResolver, SilenceLayout};
use crate::site;
use crate::types::{CourseDefinition, Resolution};

/// Result of assembling one course.
#[derive(Debug, Clone)]
pub struct CourseOutcome {
    /// Finalized tracks that produced at least one part, ordered by language
    pub tracks: Vec<FinalizedTrack>,
    /// Sentences left out of at least one track
    pub skipped: usize,
}

/// Assembles courses with a fixed configuration, clip store and encoder.
pub struct CourseAssembler<'a, S: ClipStore> {
    config: &'a PipelineConfig,
    store: &'a S,
    encoder: &'a dyn SegmentEncoder,
    out_dir: &'a Path,
}

impl<'a, S: ClipStore> CourseAssembler<'a, S> {
    pub fn new(
        config: &'a PipelineConfig,
        store: &'a S,
        encoder: &'a dyn SegmentEncoder,
        out_dir: &'a Path,
    ) -> Self {
        Self {
            config,
            store,
            encoder,
            out_dir,
        }
    }

    /// Build and encode every translation track of `course`.
    ///
    /// Missing clips and translations only drop the affected sentence from
    /// the affected track; encoding failures are returned.
    pub fn process(&self, course: &CourseDefinition) -> Result<CourseOutcome> {
        let (tracks, skipped) = self.assemble_tracks(course)?;
        let mut finalized = Vec::with_capacity(tracks.len());
        for (language, track) in tracks {
            let done = track
                .finalize(
                    &course.slug,
                    self.out_dir,
                    self.encoder,
                    self.config.min_segment_ms,
                )
                .with_context(|| format!("failed to finalize {} track {}", course.slug, language))?;
            if done.is_empty() {
                info!(course = %course.slug, %language, "no resolvable sentences; track omitted");
                continue;
            }
            finalized.push(done);
        }
        Ok(CourseOutcome {
            tracks: finalized,
            skipped,
        })
    }

    /// Fold every resolvable sentence into one track per language.
    pub fn assemble_tracks(
        &self,
        course: &CourseDefinition,
    ) -> Result<(BTreeMap<String, TranslationTrack>, usize)> {
        let resolver = SentenceResolver::new(self.store, SilenceLayout::from(self.config));
        let mut tracks: BTreeMap<String, TranslationTrack> = translation_languages(course)
            .into_iter()
            .filter(|language| self.config.wants_language(language))
            .map(|language| {
                let track = TranslationTrack::new(
                    language.clone(),
                    self.config.page_size,
                    self.config.sample_rate,
                );
                (language, track)
            })
            .collect();
        let mut skipped = 0;

        for (index, sentence) in course.sentences.iter().enumerate() {
            if let Some(reason) = resolver.missing_source(sentence) {
                warn!(
                    course = %course.slug,
                    sentence = index,
                    "skipping \"{}\" for every language: {}",
                    sentence.text,
                    reason
                );
                skipped += 1;
                continue;
            }
            let mut dropped = false;
            for (language, track) in tracks.iter_mut() {
                match resolver.resolve(sentence, language) {
                    Resolution::Resolved(unit) => track.fold(index, unit)?,
                    Resolution::Skipped(reason) => {
                        warn!(
                            course = %course.slug,
                            sentence = index,
                            %language,
                            "skipping \"{}\": {}",
                            sentence.text,
                            reason
                        );
                        dropped = true;
                    }
                }
            }
            if dropped {
                skipped += 1;
            }
        }
        Ok((tracks, skipped))
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Courses with at least one written track
    pub produced: usize,
    /// Courses that loaded but produced nothing
    pub empty: usize,
    /// Courses rejected as unreadable or malformed
    pub failed: usize,
    pub tracks: usize,
    pub parts: usize,
    pub skipped_sentences: usize,
}

/// Build every course under `paths.languages_dir` and write the site.
///
/// The audio and pages directories are recreated. A malformed course, or one
/// whose slug an earlier file already claimed, is logged and skipped; an
/// encoding failure stops the run.
pub fn run(
    paths: &AppPaths,
    config: &PipelineConfig,
    encoder: &dyn SegmentEncoder,
) -> Result<RunSummary> {
    config.validate()?;
    let audio_dir = paths.audio_dir();
    recreate_dir(&audio_dir)?;
    recreate_dir(&paths.pages_dir())?;

    let course_files = discover_course_files(&paths.languages_dir)?;
    info!(
        count = course_files.len(),
        dir = %paths.languages_dir.display(),
        "found course files"
    );

    let store = FsClipStore::new(paths.clip_dir());
    let assembler = CourseAssembler::new(config, &store, encoder, &audio_dir);
    let mut summary = RunSummary::default();
    let mut entries = Vec::new();
    let mut slugs = BTreeSet::new();

    for path in &course_files {
        let loaded = CourseFile::load(path).and_then(|file| {
            if slugs.insert(file.definition.slug.clone()) {
                Ok(file.definition)
            } else {
                Err(CourseError::Malformed {
                    path: path.clone(),
                    message: format!(
                        "slug {:?} is already used by another course",
                        file.definition.slug
                    ),
                })
            }
        });
        let course = match loaded {
            Ok(course) => course,
            Err(err) => {
                error!("{err}");
                summary.failed += 1;
                continue;
            }
        };
        info!(course = %course.slug, name = %course.name, "processing course");

        let outcome = assembler
            .process(&course)
            .with_context(|| format!("failed to build course {:?}", path))?;
        summary.skipped_sentences += outcome.skipped;
        if outcome.tracks.is_empty() {
            summary.empty += 1;
            continue;
        }
        summary.produced += 1;
        for track in &outcome.tracks {
            summary.tracks += 1;
            summary.parts += track.parts.len();
            entries.push(CourseCatalogEntry::from_track(&course, track));
        }
    }

    let catalog = Catalog::new(entries);
    catalog.write(&paths.catalog_path())?;
    site::write_site(
        &catalog,
        &paths.index_path(),
        &paths.pages_dir(),
        AUDIO_SUBDIR,
    )?;

    info!(
        produced = summary.produced,
        empty = summary.empty,
        failed = summary.failed,
        tracks = summary.tracks,
        parts = summary.parts,
        skipped = summary.skipped_sentences,
        "all courses processed"
    );
    Ok(summary)
}

fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).with_context(|| format!("failed to clear {:?}", dir))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {:?}", dir))
}
