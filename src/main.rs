//! skillmatch: rank resumes against job postings and validate candidate skills

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use skillmatch::cli::{self, Cli, Commands, ConfigAction};
use skillmatch::config::{Config, OutputFormat, ValidationConfig};
use skillmatch::error::{Result, SkillMatchError};
use skillmatch::input::manager::InputManager;
use skillmatch::models::{CandidateProfile, JobPosting, SkillChallenge};
use skillmatch::output::formatter::{save_report_to_file, suggest_filename, OutputFormatter, ReportGenerator};
use skillmatch::output::report::{MatchReport, ReportMetadata, ValidationReport};
use skillmatch::processing::embeddings::Model2VecEmbedder;
use skillmatch::processing::repository::InMemoryRepository;
use skillmatch::processing::resume_parser::ResumeParser;
use skillmatch::processing::vector_index::FlatIndex;
use skillmatch::processing::MatchingEngine;
use skillmatch::validation::grader::ConfiguredGrader;
use skillmatch::validation::interview::SimulatedInterviewer;
use skillmatch::validation::SkillValidationEngine;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

const RESUME_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn resolve_format(requested: Option<String>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(&format).map_err(SkillMatchError::InvalidInput),
        None => Ok(config.output.format),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let generator = ReportGenerator::with_options(config.output.color_output, true, true);

    match command {
        Commands::Parse { resume, output } => {
            let format = resolve_format(output, &config)?;
            let parser = ResumeParser::from_config(&config.skills)?;
            let profile = parse_resume(&parser, &InputManager::new(), &resume).await?;
            println!("{}", generator.formatter(&format).format_profile(&profile)?);
        }

        Commands::Match {
            job,
            resumes,
            top_k,
            output,
            save,
        } => {
            let format = resolve_format(output, &config)?;
            let job = load_job(&job).await?;
            let top_k = top_k.unwrap_or(config.matching.default_top_k);
            let report = run_match(&config, job, &resumes, top_k).await?;

            let rendered = generator.generate_match_report(&report, &format)?;
            println!("{}", rendered);

            if let Some(path) = save {
                let path = if path.is_dir() {
                    path.join(suggest_filename(&format, &report.job.title, true))
                } else {
                    path
                };
                let content = if format == OutputFormat::Console {
                    ReportGenerator::with_options(false, true, true).generate_match_report(&report, &format)?
                } else {
                    rendered
                };
                save_report_to_file(&content, &path)?;
                info!("Report saved to {}", path.display());
            }
        }

        Commands::Challenge => {
            let engine = validation_engine(&config.validation);
            let challenge = engine.create_coding_challenge();
            println!("{}", generator.formatter(&config.output.format).format_challenge(&challenge)?);
        }

        Commands::Evaluate {
            solution,
            candidate,
            output,
        } => {
            let format = resolve_format(output, &config)?;
            let solution = tokio::fs::read_to_string(&solution).await?;

            let start_time = Instant::now();
            let engine = validation_engine(&config.validation.for_evaluation());
            let challenge: SkillChallenge = engine.create_coding_challenge();
            let result = engine
                .evaluate_coding_solution(&challenge.id, &solution)
                .await?
                .with_candidate(candidate);

            let report = ValidationReport::coding(
                challenge,
                result,
                ReportMetadata::new(start_time.elapsed().as_millis() as u64, None),
            );
            println!("{}", generator.generate_validation_report(&report, &format)?);
        }

        Commands::Interview {
            candidate,
            scenario,
            output,
        } => {
            let format = resolve_format(output, &config)?;
            let start_time = Instant::now();
            let result = validation_engine(&config.validation).conduct_ai_interview(&candidate, &scenario).await;

            let report = ValidationReport::interview(
                result,
                ReportMetadata::new(start_time.elapsed().as_millis() as u64, None),
            );
            println!("{}", generator.generate_validation_report(&report, &format)?);
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("Configuration ({})\n", path.display());
                    println!("{}", toml::to_string_pretty(&config)?);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset to defaults: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

async fn parse_resume(parser: &ResumeParser, input: &InputManager, path: &Path) -> Result<CandidateProfile> {
    cli::validate_file_extension(path, RESUME_EXTENSIONS)
        .map_err(|e| SkillMatchError::UnsupportedFormat(format!("{}: {}", path.display(), e)))?;

    let (bytes, filename) = input.read_bytes(path).await?;
    parser.parse(&bytes, &filename)
}

async fn load_job(path: &Path) -> Result<JobPosting> {
    let content = tokio::fs::read_to_string(path).await?;
    toml::from_str(&content)
        .map_err(|e| SkillMatchError::InvalidInput(format!("Invalid job posting {}: {}", path.display(), e)))
}

async fn run_match(config: &Config, job: JobPosting, resumes: &[PathBuf], top_k: usize) -> Result<MatchReport> {
    let start_time = Instant::now();

    let mut embedder = Model2VecEmbedder::new(&config.embedding);
    embedder.load().await?;
    let model_id = embedder.model_id().to_string();

    let engine = MatchingEngine::from_config(
        embedder,
        FlatIndex::new(),
        InMemoryRepository::<CandidateProfile>::new(),
        config,
    );
    let parser = ResumeParser::from_config(&config.skills)?;
    let input = InputManager::new();

    let progress = ProgressBar::new(resumes.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} Indexing resumes [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut profiles = Vec::with_capacity(resumes.len());
    for path in resumes {
        progress.set_message(path.display().to_string());
        match parse_resume(&parser, &input, path).await {
            Ok(profile) => {
                engine.add_candidate_to_index(profile.clone()).await?;
                profiles.push(profile);
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();
    info!("Indexed {} of {} resumes", profiles.len(), resumes.len());

    let matches = engine.find_matches_for_job(&job, top_k).await?;

    Ok(MatchReport::new(
        job,
        matches,
        &profiles,
        engine.index_size().await,
        ReportMetadata::new(start_time.elapsed().as_millis() as u64, Some(model_id)),
    ))
}

fn validation_engine(
    config: &ValidationConfig,
) -> SkillValidationEngine<InMemoryRepository<SkillChallenge>, ConfiguredGrader, SimulatedInterviewer> {
    SkillValidationEngine::new(
        InMemoryRepository::new(),
        ConfiguredGrader::from_config(config),
        SimulatedInterviewer,
        config,
    )
}
