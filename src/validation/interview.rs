//! Soft-skills interview assessment

use crate::error::{Result, SkillMatchError};
use log::debug;
use regex::Regex;
use std::future::Future;
use std::time::Instant;

pub const SIMULATED_SCORE: f32 = 85.0;
pub const SIMULATED_DURATION_SECS: u64 = 300;
pub const SIMULATED_FEEDBACK: &str = "Strong communication skills. Explained technical concepts clearly without excessive jargon. Showed confidence and professionalism.";

#[derive(Debug, Clone, PartialEq)]
pub struct InterviewAssessment {
    pub score: f32,
    pub feedback: String,
    pub duration_secs: u64,
}

/// Scores a rendered interview prompt.
pub trait Interviewer: Send + Sync {
    fn assess(&self, prompt: &str) -> impl Future<Output = Result<InterviewAssessment>> + Send;
}

/// Any text-generation backend, local or remote.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Deterministic stand-in that returns the same assessment for every prompt.
#[derive(Debug, Clone, Default)]
pub struct SimulatedInterviewer;

impl Interviewer for SimulatedInterviewer {
    async fn assess(&self, _prompt: &str) -> Result<InterviewAssessment> {
        Ok(InterviewAssessment {
            score: SIMULATED_SCORE,
            feedback: SIMULATED_FEEDBACK.to_string(),
            duration_secs: SIMULATED_DURATION_SECS,
        })
    }
}

/// Asks a [`TextGenerator`] for a `SCORE:` / `FEEDBACK:` answer.
pub struct LlmInterviewer<G> {
    generator: G,
    score_regex: Regex,
    feedback_regex: Regex,
}

impl<G: TextGenerator> LlmInterviewer<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            score_regex: Regex::new(r"(?i)score\s*[:=]\s*(\d+(?:\.\d+)?)").expect("Invalid score regex"),
            feedback_regex: Regex::new(r"(?is)feedback\s*[:=]\s*(.+)").expect("Invalid feedback regex"),
        }
    }

    /// Pull score and feedback out of the model's answer. The score is
    /// clamped into `0..=100`; a missing score is an error.
    pub fn parse_assessment(&self, output: &str) -> Result<(f32, String)> {
        let score = self
            .score_regex
            .captures(output)
            .and_then(|caps| caps[1].parse::<f32>().ok())
            .ok_or_else(|| SkillMatchError::Generation("No score found in interview assessment".to_string()))?
            .clamp(0.0, 100.0);

        let feedback = self
            .feedback_regex
            .captures(output)
            .map(|caps| caps[1].trim().to_string())
            .filter(|feedback| !feedback.is_empty())
            .unwrap_or_else(|| "No feedback provided.".to_string());

        Ok((score, feedback))
    }
}

impl<G: TextGenerator> Interviewer for LlmInterviewer<G> {
    async fn assess(&self, prompt: &str) -> Result<InterviewAssessment> {
        let start_time = Instant::now();
        let output = self.generator.generate(prompt).await?;
        debug!("Interview generator returned {} chars", output.len());

        let (score, feedback) = self.parse_assessment(&output)?;
        Ok(InterviewAssessment {
            score,
            feedback,
            duration_secs: start_time.elapsed().as_secs(),
        })
    }
}
