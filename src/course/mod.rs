//! Course documents: discovery, parsing and write-back

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{CourseDefinition, SentenceRecord, TranslationEntry};

const DEFAULT_VERSION: &str = "1";

/// Failures that abort one course but not the run.
#[derive(Debug, Error)]
pub enum CourseError {
    #[error("failed to read course file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed course definition {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("failed to write course file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A course definition together with the file it came from.
///
/// The parsed document is kept alongside the definition. `save` rewrites only
/// the fields the definition owns, so unknown keys, their order and the
/// original `version` value survive a write-back.
#[derive(Debug, Clone)]
pub struct CourseFile {
    pub path: PathBuf,
    pub definition: CourseDefinition,
    document: Map<String, Value>,
    loaded_version: String,
}

#[derive(Debug, Deserialize)]
struct RawCourse {
    slug: String,
    course_name: String,
    language_code: String,
    #[serde(default)]
    version: Option<RawVersion>,
    sentences: Vec<RawSentence>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize, Serialize)]
struct RawSentence {
    sentence: (String, String, String),
    #[serde(default)]
    translations: Vec<(String, String, String)>,
}

impl CourseFile {
    pub fn load(path: &Path) -> Result<Self, CourseError> {
        let raw = fs::read_to_string(path).map_err(|source| CourseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> Result<Self, CourseError> {
        let malformed = |message: String| CourseError::Malformed {
            path: path.to_path_buf(),
            message,
        };
        let document: Map<String, Value> =
            serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
        let course: RawCourse = serde_json::from_value(Value::Object(document.clone()))
            .map_err(|e| malformed(e.to_string()))?;
        if course.slug.trim().is_empty() {
            return Err(malformed("slug must not be empty".to_string()));
        }
        if course.language_code.trim().is_empty() {
            return Err(malformed("language_code must not be empty".to_string()));
        }

        let version = match course.version {
            Some(RawVersion::Text(text)) => text,
            Some(RawVersion::Number(number)) => number.to_string(),
            None => DEFAULT_VERSION.to_string(),
        };
        let sentences = course
            .sentences
            .into_iter()
            .map(|raw| {
                let (text, first_clip, second_clip) = raw.sentence;
                SentenceRecord {
                    text,
                    first_clip,
                    second_clip,
                    translations: raw
                        .translations
                        .into_iter()
                        .map(|(language, text, clip)| TranslationEntry {
                            language,
                            text,
                            clip,
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            definition: CourseDefinition {
                slug: course.slug,
                name: course.course_name,
                language_code: course.language_code,
                version: version.clone(),
                sentences,
            },
            document,
            loaded_version: version,
        })
    }

    /// Write the definition back to `self.path` as pretty, non-escaped JSON.
    ///
    /// `version` is only written when the definition changed it.
    pub fn save(&self) -> Result<(), CourseError> {
        let write_error = |source: std::io::Error| CourseError::Write {
            path: self.path.clone(),
            source,
        };
        let def = &self.definition;
        let sentences: Vec<RawSentence> = def
            .sentences
            .iter()
            .map(|s| RawSentence {
                sentence: (s.text.clone(), s.first_clip.clone(), s.second_clip.clone()),
                translations: s
                    .translations
                    .iter()
                    .map(|t| (t.language.clone(), t.text.clone(), t.clip.clone()))
                    .collect(),
            })
            .collect();
        let sentences = serde_json::to_value(sentences)
            .map_err(|e| write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let mut document = self.document.clone();
        document.insert("slug".to_string(), Value::from(def.slug.clone()));
        document.insert("course_name".to_string(), Value::from(def.name.clone()));
        document.insert("language_code".to_string(), Value::from(def.language_code.clone()));
        if def.version != self.loaded_version {
            document.insert("version".to_string(), Value::from(def.version.clone()));
        }
        document.insert("sentences".to_string(), sentences);

        let mut json = serde_json::to_string_pretty(&document)
            .map_err(|e| write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        json.push('\n');
        fs::write(&self.path, json).map_err(write_error)
    }

    /// File name used as a prefix for generated clips.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.definition.slug.clone())
    }
}

/// All `*.json` course documents directly under `dir`, sorted by file name.
pub fn discover_course_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list course directory {:?}", dir))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read entry in {:?}", dir))?
            .path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Translation languages of a course in order of first appearance.
pub fn translation_languages(course: &CourseDefinition) -> Vec<String> {
    let mut languages: Vec<String> = Vec::new();
    for translation in course.sentences.iter().flat_map(|s| &s.translations) {
        if !languages.contains(&translation.language) {
            languages.push(translation.language.clone());
        }
    }
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const COURSE: &str = r#"{
        "slug": "spanish-basics",
        "course_name": "Spanish basics",
        "language_code": "es-ES",
        "version": 2,
        "level": "A1",
        "sentences": [
            {
                "sentence": ["Hola", "hola_1.mp3", "hola_2.mp3"],
                "translations": [["en-US", "Hello", "hello.mp3"], ["fr-FR", "Bonjour", ""]]
            },
            {
                "sentence": ["Adiós", "", "adios_2.mp3"],
                "translations": [["de-DE", "Tschüss", "tschuess.mp3"], ["en-US", "Bye", "bye.mp3"]]
            }
        ]
    }"#;

    #[test]
    fn parses_sentences_and_translations() {
        let file = CourseFile::parse(Path::new("es.json"), COURSE).unwrap();
        let def = &file.definition;
        assert_eq!(def.slug, "spanish-basics");
        assert_eq!(def.version, "2");
        assert_eq!(def.sentences.len(), 2);
        assert_eq!(def.sentences[0].second_clip, "hola_2.mp3");
        assert_eq!(def.sentences[1].first_clip, "");
        assert_eq!(def.sentences[0].translations[1].clip, "");
    }

    #[test]
    fn languages_follow_first_appearance() {
        let file = CourseFile::parse(Path::new("es.json"), COURSE).unwrap();
        assert_eq!(
            translation_languages(&file.definition),
            vec!["en-US", "fr-FR", "de-DE"]
        );
    }

    #[test]
    fn missing_field_is_malformed() {
        let raw = r#"{"slug": "x", "language_code": "es-ES", "sentences": []}"#;
        let err = CourseFile::parse(Path::new("x.json"), raw).unwrap_err();
        assert!(matches!(err, CourseError::Malformed { .. }));
        assert!(err.to_string().contains("course_name"));
    }

    #[test]
    fn short_sentence_tuple_is_malformed() {
        let raw = r#"{"slug": "x", "course_name": "X", "language_code": "es-ES",
                      "sentences": [{"sentence": ["Hola", "a.mp3"], "translations": []}]}"#;
        assert!(matches!(
            CourseFile::parse(Path::new("x.json"), raw),
            Err(CourseError::Malformed { .. })
        ));
    }

    #[test]
    fn version_defaults_when_absent() {
        let raw = r#"{"slug": "x", "course_name": "X", "language_code": "es-ES", "sentences": []}"#;
        let file = CourseFile::parse(Path::new("x.json"), raw).unwrap();
        assert_eq!(file.definition.version, "1");
    }

    #[test]
    fn save_keeps_unknown_fields_and_updates() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("es.json");
        fs::write(&path, COURSE).unwrap();

        let mut file = CourseFile::load(&path).unwrap();
        file.definition.sentences[1].first_clip = "adios_1.mp3".to_string();
        file.save().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Adiós"));
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["version"], serde_json::json!(2));
        assert_eq!(value["level"], serde_json::json!("A1"));
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["slug", "course_name", "language_code", "version", "level", "sentences"]
        );
        let reloaded = CourseFile::load(&path).unwrap();
        assert_eq!(reloaded.definition.sentences[1].first_clip, "adios_1.mp3");
        assert_eq!(reloaded.definition.version, "2");
    }

    #[test]
    fn save_does_not_add_missing_version() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("x.json");
        fs::write(
            &path,
            r#"{"slug": "x", "course_name": "X", "language_code": "es-ES", "sentences": []}"#,
        )
        .unwrap();

        CourseFile::load(&path).unwrap().save().unwrap();
        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.get("version").is_none());
    }

    #[test]
    fn changed_version_is_written() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("es.json");
        fs::write(&path, COURSE).unwrap();

        let mut file = CourseFile::load(&path).unwrap();
        file.definition.version = "3".to_string();
        file.save().unwrap();
        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["version"], serde_json::json!("3"));
    }

    #[test]
    fn non_object_document_is_malformed() {
        assert!(matches!(
            CourseFile::parse(Path::new("x.json"), "[1, 2]"),
            Err(CourseError::Malformed { .. })
        ));
    }

    #[test]
    fn discovers_only_json_in_sorted_order() {
        let temp = tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            fs::write(temp.path().join(name), "{}").unwrap();
        }
        fs::create_dir(temp.path().join("individual_audios")).unwrap();
        let files = discover_course_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
