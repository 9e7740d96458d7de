//! Graders score a solution to a [`SkillChallenge`].
//!
//! Two implementations trade cost for accuracy: [`KeywordGrader`] only
//! looks for rubric keywords in the answer text and never runs anything,
//! while [`ExecutionGrader`] runs the submission in a child process and
//! compares its output.

use crate::config::{GraderKind, ValidationConfig};
use crate::error::{Result, SkillMatchError};
use crate::models::SkillChallenge;
use log::debug;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::process::Command;

pub const SCORE_ALL_FOUND: f32 = 95.0;
pub const SCORE_PARTIAL: f32 = 70.0;
pub const SCORE_NONE_FOUND: f32 = 30.0;

pub const SCORE_OUTPUT_MATCH: f32 = 100.0;
pub const SCORE_OUTPUT_MISMATCH: f32 = 40.0;
pub const SCORE_RUN_FAILED: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub score: f32,
    pub feedback: String,
    pub time_taken: Option<u64>,
}

pub trait Grader: Send + Sync {
    fn grade(&self, challenge: &SkillChallenge, solution: &str) -> impl Future<Output = Result<Grade>> + Send;
}

/// Case-insensitive rubric keyword heuristic.
#[derive(Debug, Clone, Default)]
pub struct KeywordGrader;

impl KeywordGrader {
    pub fn score(&self, challenge: &SkillChallenge, solution: &str) -> Result<Grade> {
        if challenge.rubric.is_empty() {
            return Err(SkillMatchError::Grading(format!(
                "Challenge '{}' has no rubric keywords",
                challenge.title
            )));
        }

        let solution_lower = solution.to_lowercase();
        let found = challenge
            .rubric
            .iter()
            .filter(|keyword| solution_lower.contains(&keyword.to_lowercase()))
            .count();
        debug!("Rubric hits for {}: {}/{}", challenge.id, found, challenge.rubric.len());

        let (score, feedback) = if found == challenge.rubric.len() {
            (SCORE_ALL_FOUND, &challenge.feedback.all_found)
        } else if found > 0 {
            (SCORE_PARTIAL, &challenge.feedback.partial)
        } else {
            (SCORE_NONE_FOUND, &challenge.feedback.none_found)
        };

        Ok(Grade {
            score,
            feedback: feedback.clone(),
            time_taken: None,
        })
    }
}

impl Grader for KeywordGrader {
    async fn grade(&self, challenge: &SkillChallenge, solution: &str) -> Result<Grade> {
        self.score(challenge, solution)
    }
}

/// Runs the solution with an interpreter and compares stdout against the
/// challenge's expected output. Only meaningful for challenges whose
/// `expected_output` is literal program output.
#[derive(Debug, Clone)]
pub struct ExecutionGrader {
    interpreter: String,
    timeout: Duration,
}

impl ExecutionGrader {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    async fn run(&self, challenge: &SkillChallenge, solution: &str) -> Result<Grade> {
        let mut script = tempfile::NamedTempFile::new()?;
        script.write_all(solution.as_bytes())?;
        script.flush()?;

        let start_time = Instant::now();
        let child = Command::new(&self.interpreter)
            .arg(script.path())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| SkillMatchError::Timeout {
                operation: format!("Running solution for challenge {}", challenge.id),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| SkillMatchError::Grading(format!("Failed to start '{}': {}", self.interpreter, e)))?;
        let elapsed = start_time.elapsed().as_secs();

        let (score, feedback) = if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(200).collect();
            (SCORE_RUN_FAILED, format!("Solution exited with {}: {}", output.status, excerpt))
        } else if String::from_utf8_lossy(&output.stdout).trim() == challenge.expected_output.trim() {
            (SCORE_OUTPUT_MATCH, "Output matches the expected result.".to_string())
        } else {
            (SCORE_OUTPUT_MISMATCH, "Solution ran but produced different output.".to_string())
        };

        Ok(Grade {
            score,
            feedback,
            time_taken: Some(elapsed),
        })
    }
}

impl Grader for ExecutionGrader {
    async fn grade(&self, challenge: &SkillChallenge, solution: &str) -> Result<Grade> {
        self.run(challenge, solution).await
    }
}

/// Grader picked at runtime from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredGrader {
    Keyword(KeywordGrader),
    Execution(ExecutionGrader),
}

impl ConfiguredGrader {
    pub fn from_config(config: &ValidationConfig) -> Self {
        match config.grader {
            GraderKind::Keyword => ConfiguredGrader::Keyword(KeywordGrader),
            GraderKind::Execution => ConfiguredGrader::Execution(ExecutionGrader::new(
                config.interpreter.clone(),
                Duration::from_secs(config.execution_timeout_secs),
            )),
        }
    }
}

impl Grader for ConfiguredGrader {
    async fn grade(&self, challenge: &SkillChallenge, solution: &str) -> Result<Grade> {
        match self {
            ConfiguredGrader::Keyword(grader) => grader.grade(challenge, solution).await,
            ConfiguredGrader::Execution(grader) => grader.grade(challenge, solution).await,
        }
    }
}
