//! CLI interface for skillmatch

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skillmatch")]
#[command(about = "Semantic candidate matching and skill validation")]
#[command(long_about = "Parse resumes into candidate profiles, rank them against job postings with embeddings and skill overlap, and validate skills with coding challenges and interviews")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a candidate profile from a resume
    Parse {
        /// Path to resume file (PDF, TXT, MD)
        resume: PathBuf,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Rank resumes against a job posting
    Match {
        /// Job posting (TOML)
        #[arg(short, long)]
        job: PathBuf,

        /// Resume files to index
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        /// Number of candidates to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Issue a coding challenge
    Challenge,

    /// Grade a solution against the first challenge in the bank
    Evaluate {
        /// File containing the solution
        #[arg(short, long)]
        solution: PathBuf,

        /// Candidate the result is recorded for
        #[arg(long, default_value = "")]
        candidate: String,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run a soft-skills interview assessment
    Interview {
        /// Candidate id
        #[arg(long)]
        candidate: String,

        /// Interview scenario
        #[arg(long)]
        scenario: String,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
