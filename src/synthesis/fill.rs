use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use super::{
    synthesize_with_retry, RetryPolicy, SpeechSynthesizer, SynthesisRequest, PRIMARY_VOICE,
    SECONDARY_VOICE,
};
use crate::course::CourseFile;
use crate::resolver::{ClipStore, FsClipStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub generated: usize,
}

/// Timestamp embedded in generated clip names.
pub fn generation_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Synthesize every clip of `file` whose reference is empty or points at a
/// missing file, provided the matching text is non-empty.
///
/// The course file is saved after each sentence that gained a clip, so an
/// interrupted run keeps what was already generated.
pub fn fill_missing_clips(
    file: &mut CourseFile,
    clip_dir: &Path,
    synthesizer: &dyn SpeechSynthesizer,
    policy: &RetryPolicy,
    timestamp: &str,
) -> Result<FillReport> {
    fs::create_dir_all(clip_dir)
        .with_context(|| format!("failed to create clip directory {:?}", clip_dir))?;
    let store = FsClipStore::new(clip_dir);
    let prefix = file.file_name();
    let source_language = file.definition.language_code.clone();
    let mut report = FillReport::default();

    for i in 0..file.definition.sentences.len() {
        let mut changed = false;
        let sentence = &mut file.definition.sentences[i];

        if !sentence.text.is_empty() {
            let repetitions = [
                (&mut sentence.first_clip, "t1", PRIMARY_VOICE),
                (&mut sentence.second_clip, "t2", SECONDARY_VOICE),
            ];
            for (clip, tag, voice) in repetitions {
                if store.exists(clip) {
                    continue;
                }
                info!("sentence audio file not found: {}", sentence.text);
                let name = format!("{prefix}_{i}_{tag}_{timestamp}.mp3");
                let request = SynthesisRequest {
                    text: sentence.text.clone(),
                    language: source_language.clone(),
                    voice: voice.to_string(),
                };
                generate(synthesizer, policy, &store, &name, &request)?;
                *clip = name;
                changed = true;
                report.generated += 1;
            }
        }

        for (y, translation) in sentence.translations.iter_mut().enumerate() {
            if translation.text.is_empty() || store.exists(&translation.clip) {
                continue;
            }
            info!("translation audio file not found: {}", translation.text);
            let name = format!("{prefix}_{i}_{y}_{timestamp}.mp3");
            let request = SynthesisRequest {
                text: translation.text.clone(),
                language: translation.language.clone(),
                voice: PRIMARY_VOICE.to_string(),
            };
            generate(synthesizer, policy, &store, &name, &request)?;
            translation.clip = name;
            changed = true;
            report.generated += 1;
        }

        if changed {
            file.save()?;
        }
    }
    Ok(report)
}

fn generate(
    synthesizer: &dyn SpeechSynthesizer,
    policy: &RetryPolicy,
    store: &FsClipStore,
    name: &str,
    request: &SynthesisRequest,
) -> Result<()> {
    let output = store.path_of(name);
    synthesize_with_retry(synthesizer, request, &output, policy)
        .with_context(|| format!("failed to synthesize {:?} ({})", request.text, request.language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::SynthesisError;
    use std::cell::RefCell;
    use std::time::Duration;
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeSynth {
        requests: RefCell<Vec<SynthesisRequest>>,
    }

    impl SpeechSynthesizer for FakeSynth {
        fn synthesize(&self, request: &SynthesisRequest, output: &Path) -> Result<(), SynthesisError> {
            self.requests.borrow_mut().push(request.clone());
            fs::write(output, b"ID3")?;
            Ok(())
        }
    }

    const COURSE: &str = r#"{
        "slug": "es",
        "course_name": "Spanish",
        "language_code": "es-ES",
        "sentences": [
            {"sentence": ["Hola", "", "hola_2.mp3"],
             "translations": [["en-US", "Hello", "hello.mp3"], ["fr-FR", "Bonjour", ""]]},
            {"sentence": ["", "", ""], "translations": [["en-US", "", ""]]}
        ]
    }"#;

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            inter_call_delay: Duration::ZERO,
        }
    }

    #[test]
    fn generates_only_missing_clips_and_saves() {
        let temp = tempdir().unwrap();
        let clips = temp.path().join("individual_audios");
        fs::create_dir_all(&clips).unwrap();
        fs::write(clips.join("hola_2.mp3"), b"ID3").unwrap();
        fs::write(clips.join("hello.mp3"), b"ID3").unwrap();
        let path = temp.path().join("es.json");
        fs::write(&path, COURSE).unwrap();

        let mut file = CourseFile::load(&path).unwrap();
        let synth = FakeSynth::default();
        let report = fill_missing_clips(&mut file, &clips, &synth, &instant(), "20250101_000000")
            .unwrap();

        assert_eq!(report.generated, 2);
        let requests = synth.requests.borrow();
        assert_eq!(requests[0].voice, PRIMARY_VOICE);
        assert_eq!(requests[0].language, "es-ES");
        assert_eq!(requests[1].language, "fr-FR");

        let reloaded = CourseFile::load(&path).unwrap();
        let sentence = &reloaded.definition.sentences[0];
        assert_eq!(sentence.first_clip, "es.json_0_t1_20250101_000000.mp3");
        assert_eq!(sentence.second_clip, "hola_2.mp3");
        assert_eq!(sentence.translations[1].clip, "es.json_0_1_20250101_000000.mp3");
        assert!(clips.join(&sentence.first_clip).is_file());
        assert_eq!(reloaded.definition.sentences[1].first_clip, "");
    }

    #[test]
    fn complete_course_is_left_untouched() {
        let temp = tempdir().unwrap();
        let clips = temp.path().join("individual_audios");
        let path = temp.path().join("es.json");
        let raw = r#"{"slug": "es", "course_name": "Spanish", "language_code": "es-ES", "sentences": []}"#;
        fs::write(&path, raw).unwrap();

        let mut file = CourseFile::load(&path).unwrap();
        let report =
            fill_missing_clips(&mut file, &clips, &FakeSynth::default(), &instant(), "ts").unwrap();
        assert_eq!(report.generated, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), raw);
    }

    #[test]
    fn timestamp_has_date_and_time() {
        let ts = generation_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
    }
}
