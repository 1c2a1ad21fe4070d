use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Context, Result};
use serde::Deserialize;

/// Subdirectory of the languages directory holding every clip.
pub const CLIP_SUBDIR: &str = "individual_audios";
pub const AUDIO_SUBDIR: &str = "output_audio";
const PAGES_SUBDIR: &str = "courses";
const CATALOG_FILE: &str = "catalog.json";

/// Target encoding for assembled parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp3,
    Wav,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Wav => "wav",
        }
    }
}

/// Silence, paging and encoding parameters shared by the resolver and the
/// assembler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gap between the second and the first repetition
    #[serde(alias = "interClipSilenceMs")]
    pub inter_clip_silence_ms: u32,
    /// Gap before the translation clip
    #[serde(alias = "preSilenceMs")]
    pub pre_silence_ms: u32,
    /// Gap after the translation clip
    #[serde(alias = "postSilenceMs")]
    pub post_silence_ms: u32,
    /// Phrases per output part
    #[serde(alias = "pageSize")]
    pub page_size: usize,
    pub sample_rate: u32,
    pub bitrate_kbps: u32,
    pub output_format: OutputFormat,
    /// Parts at or below this length are not written
    pub min_segment_ms: u32,
    /// Restrict the tracks built; empty means every language in the course
    pub translation_languages: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inter_clip_silence_ms: 1000,
            pre_silence_ms: 1500,
            post_silence_ms: 2500,
            page_size: 30,
            sample_rate: 22_050,
            bitrate_kbps: 128,
            output_format: OutputFormat::Mp3,
            min_segment_ms: 10,
            translation_languages: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline config {:?}", path))?;
        let config: PipelineConfig =
            serde_json::from_str(&raw).context("failed to parse pipeline config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.page_size > 0, "page_size must be greater than zero");
        ensure!(self.sample_rate > 0, "sample_rate must be positive");
        ensure!(self.bitrate_kbps > 0, "bitrate_kbps must be positive");
        Ok(())
    }

    /// Whether a track should be built for `language`.
    pub fn wants_language(&self, language: &str) -> bool {
        self.translation_languages.is_empty()
            || self.translation_languages.iter().any(|l| l == language)
    }
}

/// Input and output locations for one run.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub languages_dir: PathBuf,
    pub site_dir: PathBuf,
}

impl AppPaths {
    pub fn new(languages_dir: &Path, site_dir: &Path) -> Result<Self> {
        Ok(Self {
            languages_dir: canonicalize_dir(languages_dir)?,
            site_dir: site_dir.to_path_buf(),
        })
    }

    pub fn clip_dir(&self) -> PathBuf {
        self.languages_dir.join(CLIP_SUBDIR)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.site_dir.join(AUDIO_SUBDIR)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.site_dir.join(PAGES_SUBDIR)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.site_dir.join(CATALOG_FILE)
    }

    pub fn index_path(&self) -> PathBuf {
        self.site_dir.join("index.html")
    }
}

fn canonicalize_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve languages directory at {:?}", path))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(anyhow!("languages path {:?} is not a directory", canonical))
    }
}
