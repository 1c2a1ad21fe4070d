use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use super::{SpeechSynthesizer, SynthesisError, SynthesisRequest};

/// Bounded retry with exponential backoff on quota errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    /// Pause after every successful call
    pub inter_call_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(5),
            inter_call_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }
}

/// Call `synthesizer` until it succeeds, fails with a non-quota error, or
/// `policy.max_attempts` quota errors have been seen.
pub fn synthesize_with_retry(
    synthesizer: &dyn SpeechSynthesizer,
    request: &SynthesisRequest,
    output: &Path,
    policy: &RetryPolicy,
) -> Result<(), SynthesisError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match synthesizer.synthesize(request, output) {
            Ok(()) => {
                info!(output = %output.display(), language = %request.language, "audio content written");
                thread::sleep(policy.inter_call_delay);
                return Ok(());
            }
            Err(err) if err.is_quota() && attempt < attempts => {
                let wait = policy.backoff(attempt);
                warn!(
                    "quota exhausted, waiting {:?} before retry {}/{}",
                    wait, attempt, attempts
                );
                thread::sleep(wait);
                attempt += 1;
            }
            Err(err) => {
                if err.is_quota() {
                    warn!("failed after {} attempts, quota exhausted", attempts);
                }
                return Err(err);
            }
        }
    }
}
