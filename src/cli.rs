use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};

use crate::synthesis::RetryPolicy;

/// Builds multilingual audio courses and their web pages.
///
/// Without a subcommand every course in the languages directory is built.
#[derive(Parser, Debug)]
#[command(name = "coursegen", version, about = "Audio language course builder")]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble course audio, the catalog and the pages.
    Build,
    /// Generate clips that are missing from the course definitions.
    Synthesize(SynthesizeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Directory holding the course JSON files and `individual_audios/`.
    #[arg(long = "languages-dir", default_value = "languages", global = true)]
    pub languages_dir: PathBuf,
    /// Output directory for audio, catalog and pages.
    #[arg(long = "site-dir", default_value = "site", global = true)]
    pub site_dir: PathBuf,
    /// Optional JSON file overriding silences, page size and encoding.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SynthesizeArgs {
    /// Attempts per clip when the provider reports an exhausted quota.
    #[arg(long = "max-attempts", default_value_t = 3)]
    pub max_attempts: u32,
    /// Initial wait in seconds before retrying, doubled on each retry.
    #[arg(long = "backoff-secs", default_value_t = 5)]
    pub backoff_secs: u64,
    /// Pause in seconds after every generated clip.
    #[arg(long = "delay-secs", default_value_t = 10)]
    pub delay_secs: u64,
    /// Synthesizer program followed by its arguments; `{text}`, `{language}`,
    /// `{voice}` and `{output}` are substituted.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl SynthesizeArgs {
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        ensure!(self.max_attempts > 0, "max-attempts must be at least 1");
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_secs(self.backoff_secs),
            inter_call_delay: Duration::from_secs(self.delay_secs),
        })
    }
}
