#![allow(dead_code)]

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use coursegen::catalog::Catalog;
use hound::{SampleFormat, WavSpec, WavWriter};

pub const SAMPLE_RATE: u32 = 8_000;

/// Write a short sine tone so no binary fixtures live in the repository.
pub fn write_tone(path: &Path, frequency: f32, millis: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let total = SAMPLE_RATE * millis / 1000;
    for index in 0..total {
        let t = index as f32 / SAMPLE_RATE as f32;
        let sample = (f32::sin(2.0 * PI * frequency * t) * 0.5 * i16::MAX as f32) as i16;
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// A languages directory with a clip store holding `clips`.
pub fn languages_dir(root: &Path, clips: &[&str]) -> Result<PathBuf> {
    let languages = root.join("languages");
    let store = languages.join("individual_audios");
    fs::create_dir_all(&store)?;
    for (i, clip) in clips.iter().enumerate() {
        write_tone(&store.join(clip), 220.0 + 40.0 * i as f32, 200)?;
    }
    Ok(languages)
}

/// Course JSON with one sentence per `(first, second, translations)` row.
pub fn course_json(slug: &str, sentences: &[(&str, &str, &[(&str, &str)])]) -> String {
    let rows: Vec<serde_json::Value> = sentences
        .iter()
        .enumerate()
        .map(|(i, (first, second, translations))| {
            serde_json::json!({
                "sentence": [format!("phrase {i}"), first, second],
                "translations": translations
                    .iter()
                    .map(|(language, clip)| serde_json::json!([language, format!("translation {i}"), clip]))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::json!({
        "slug": slug,
        "course_name": format!("{slug} course"),
        "language_code": "es-ES",
        "version": "1",
        "sentences": rows,
    })
    .to_string()
}

pub fn read_catalog(path: &Path) -> Result<Catalog> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

pub fn wav_config(root: &Path, page_size: usize) -> Result<PathBuf> {
    let path = root.join("pipeline.json");
    fs::write(
        &path,
        serde_json::json!({
            "page_size": page_size,
            "output_format": "wav",
            "inter_clip_silence_ms": 100,
            "pre_silence_ms": 100,
            "post_silence_ms": 100,
        })
        .to_string(),
    )?;
    Ok(path)
}
