use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use coursegen::audio::encoder::encoder_for;
use coursegen::cli::{Cli, Command, PathArgs, SynthesizeArgs};
use coursegen::config::{AppPaths, PipelineConfig};
use coursegen::course::{discover_course_files, CourseFile};
use coursegen::pipeline;
use coursegen::synthesis::fill::generation_timestamp;
use coursegen::synthesis::{fill_missing_clips, CommandSynthesizer};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        None | Some(Command::Build) => handle_build(&cli.paths),
        Some(Command::Synthesize(ref args)) => handle_synthesize(&cli.paths, args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn load_config(args: &PathArgs) -> Result<PipelineConfig> {
    match &args.config {
        Some(path) => PipelineConfig::from_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn handle_build(args: &PathArgs) -> Result<()> {
    let paths = AppPaths::new(&args.languages_dir, &args.site_dir)
        .context("Failed to resolve input directory")?;
    let config = load_config(args).context("Failed to load pipeline configuration")?;
    info!(
        page_size = config.page_size,
        sample_rate = config.sample_rate,
        format = config.output_format.extension(),
        "building courses"
    );
    let encoder = encoder_for(&config);
    let summary = pipeline::run(&paths, &config, encoder.as_ref())?;
    println!(
        "Built {} course(s) into {} track(s) and {} part(s); {} empty, {} failed, {} sentence skip(s).",
        summary.produced,
        summary.tracks,
        summary.parts,
        summary.empty,
        summary.failed,
        summary.skipped_sentences
    );
    Ok(())
}

fn handle_synthesize(args: &PathArgs, synth_args: &SynthesizeArgs) -> Result<()> {
    let paths = AppPaths::new(&args.languages_dir, &args.site_dir)
        .context("Failed to resolve input directory")?;
    let policy = synth_args.retry_policy()?;
    let (program, rest) = synth_args
        .command
        .split_first()
        .context("No synthesizer command given")?;
    let synthesizer = CommandSynthesizer::new(program, rest.to_vec());
    let timestamp = generation_timestamp();

    let files = discover_course_files(&paths.languages_dir)?;
    info!(count = files.len(), "found course files");
    let mut generated = 0;
    for path in &files {
        let mut file = match CourseFile::load(path) {
            Ok(file) => file,
            Err(err) => {
                error!("{err}");
                continue;
            }
        };
        info!(course = %file.definition.name, "filling missing clips");
        let report =
            fill_missing_clips(&mut file, &paths.clip_dir(), &synthesizer, &policy, &timestamp)
                .with_context(|| format!("Failed to fill clips for {:?}", path))?;
        generated += report.generated;
    }
    println!("Generated {generated} clip(s).");
    Ok(())
}
