//! Shared records passed between the extractor, the matcher and the validator

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Location used when no place name can be resolved from a resume.
pub const DEFAULT_LOCATION: &str = "Remote";

/// Challenge id reported for soft-skill interview results.
pub const INTERVIEW_CHALLENGE_ID: &str = "soft_skills_interview";

/// Anything stored in a [`crate::processing::repository::Repository`].
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    pub name: String,
    pub skills: BTreeSet<String>,
    pub experience_years: u32,
    pub education: Vec<String>,
    pub location: String,
    /// The text that gets embedded, not the raw resume
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub years_experience: u32,
}

impl JobPosting {
    /// Text embedded for the query side of a match.
    pub fn query_text(&self) -> String {
        let skills: Vec<&str> = self.required_skills.iter().map(String::as_str).collect();
        format!(
            "{} {} Required skills: {}",
            self.title,
            self.description,
            skills.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    pub job_id: String,
    /// Similarity plus the skill-overlap bonus; can exceed 1.0
    pub score: f32,
    pub similarity: f32,
    pub matching_skills: BTreeSet<String>,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    Coding,
}

impl std::fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeType::Coding => write!(f, "coding"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillChallenge {
    pub id: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub title: String,
    pub description: String,
    pub content: String,
    pub expected_output: String,
    /// Keywords a correct answer is expected to mention
    #[serde(default)]
    pub rubric: Vec<String>,
    #[serde(default)]
    pub feedback: RubricFeedback,
}

/// What the keyword grader says at each rubric tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricFeedback {
    pub all_found: String,
    pub partial: String,
    pub none_found: String,
}

impl Default for RubricFeedback {
    fn default() -> Self {
        Self {
            all_found: "Excellent! The solution covers every part of the fix.".to_string(),
            partial: "Good! You found part of the fix, but something is still missing.".to_string(),
            none_found: "The solution is missing key elements of the fix.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub candidate_id: String,
    pub challenge_id: String,
    pub score: f32,
    pub feedback: String,
    pub time_taken: Option<u64>,
}

impl ValidationResult {
    /// Builds a result with the score clamped into `0..=100`.
    pub fn new(
        candidate_id: impl Into<String>,
        challenge_id: impl Into<String>,
        score: f32,
        feedback: impl Into<String>,
        time_taken: Option<u64>,
    ) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) };
        Self {
            candidate_id: candidate_id.into(),
            challenge_id: challenge_id.into(),
            score,
            feedback: feedback.into(),
            time_taken,
        }
    }

    pub fn with_candidate(mut self, candidate_id: impl Into<String>) -> Self {
        self.candidate_id = candidate_id.into();
        self
    }
}

impl Identified for CandidateProfile {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for JobPosting {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for SkillChallenge {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text_joins_skills() {
        let job = JobPosting {
            id: "job-1".to_string(),
            title: "ML Engineer".to_string(),
            description: "Train models".to_string(),
            required_skills: ["PyTorch", "Python"].iter().map(|s| s.to_string()).collect(),
            years_experience: 3,
        };

        assert_eq!(
            job.query_text(),
            "ML Engineer Train models Required skills: PyTorch, Python"
        );
    }

    #[test]
    fn test_validation_score_is_clamped() {
        assert_eq!(ValidationResult::new("c", "x", 140.0, "", None).score, 100.0);
        assert_eq!(ValidationResult::new("c", "x", -3.0, "", None).score, 0.0);
        assert_eq!(ValidationResult::new("c", "x", f32::NAN, "", None).score, 0.0);
        assert_eq!(ValidationResult::new("c", "x", 70.0, "", None).score, 70.0);
    }

    #[test]
    fn test_job_posting_defaults_from_toml() {
        let job: JobPosting = toml::from_str(
            r#"
            id = "job-7"
            title = "Data Scientist"
            description = "Analytics"
            "#,
        )
        .unwrap();

        assert!(job.required_skills.is_empty());
        assert_eq!(job.years_experience, 0);
    }
}
