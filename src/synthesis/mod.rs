//! Generation of missing clips through an external speech synthesizer

pub mod command;
pub mod fill;
pub mod retry;

use std::path::Path;

use thiserror::Error;

pub use command::CommandSynthesizer;
pub use fill::{fill_missing_clips, FillReport};
pub use retry::{synthesize_with_retry, RetryPolicy};

/// Voice for the first repetition of a sentence and for translations.
pub const PRIMARY_VOICE: &str = "Iapetus";
/// Voice for the second repetition of a sentence.
pub const SECONDARY_VOICE: &str = "Erinome";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: String,
    pub voice: String,
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The provider is rate limited; worth retrying after a pause
    #[error("synthesis quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("synthesis failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    pub fn is_quota(&self) -> bool {
        matches!(self, SynthesisError::QuotaExhausted(_))
    }
}

/// Turns text into an audio file at `output`.
pub trait SpeechSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest, output: &Path) -> Result<(), SynthesisError>;
}
