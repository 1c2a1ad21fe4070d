//! JSON manifest of every produced (course, translation language) pair

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assembler::FinalizedTrack;
use crate::types::CourseDefinition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseCatalogEntry {
    /// `{slug}_{translation_language}`
    pub id: String,
    pub title: String,
    pub source_language: String,
    pub translation_language: String,
    pub version: String,
    /// Part file names in playback order
    pub parts: Vec<String>,
}

impl CourseCatalogEntry {
    pub fn from_track(course: &CourseDefinition, track: &FinalizedTrack) -> Self {
        Self {
            id: format!("{}_{}", course.slug, track.language),
            title: course.name.clone(),
            source_language: course.language_code.clone(),
            translation_language: track.language.clone(),
            version: course.version.clone(),
            parts: track.parts.iter().map(|p| p.file_name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub generated_at: DateTime<Utc>,
    pub courses: Vec<CourseCatalogEntry>,
}

impl Catalog {
    pub fn new(courses: Vec<CourseCatalogEntry>) -> Self {
        Self {
            generated_at: Utc::now(),
            courses,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize catalog")?;
        fs::write(path, json).with_context(|| format!("failed to write catalog {:?}", path))
    }
}
