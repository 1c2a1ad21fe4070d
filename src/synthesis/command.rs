use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::{SpeechSynthesizer, SynthesisError, SynthesisRequest};

/// `EX_TEMPFAIL` from sysexits.h
const QUOTA_EXIT_CODE: i32 = 75;
const QUOTA_MARKER: &str = "RESOURCE_EXHAUSTED";

/// Runs an external text-to-speech program once per clip.
///
/// Arguments may contain `{text}`, `{language}`, `{voice}` and `{output}`,
/// which are substituted per request. The program signals rate limiting by
/// exiting with status 75 or printing `RESOURCE_EXHAUSTED` on stderr.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn expand(&self, request: &SynthesisRequest, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{text}", &request.text)
                    .replace("{language}", &request.language)
                    .replace("{voice}", &request.voice)
                    .replace("{output}", &output)
            })
            .collect()
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest, output: &Path) -> Result<(), SynthesisError> {
        let args = self.expand(request, output);
        debug!(program = ?self.program, ?args, "running synthesizer");
        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        if result.status.success() {
            if !output.is_file() {
                return Err(SynthesisError::Failed(format!(
                    "{:?} reported success but wrote no file at {}",
                    self.program,
                    output.display()
                )));
            }
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        if result.status.code() == Some(QUOTA_EXIT_CODE) || stderr.contains(QUOTA_MARKER) {
            return Err(SynthesisError::QuotaExhausted(stderr));
        }
        Err(SynthesisError::Failed(format!(
            "{:?} exited with {}: {}",
            self.program, result.status, stderr
        )))
    }
}
