//! Report structures for matching and validation runs

use crate::models::{CandidateProfile, JobPosting, MatchResult, SkillChallenge, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ranked candidates for one job posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub job: JobPosting,

    /// Best match first
    pub matches: Vec<RankedCandidate>,

    pub summary: MatchSummary,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// 1-based position in the ranking
    pub rank: usize,
    pub name: String,
    pub experience_years: u32,
    pub location: String,
    pub result: MatchResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub candidates_indexed: usize,
    pub candidates_returned: usize,
    pub best_score: Option<f32>,

    /// Required skills no returned candidate has
    pub uncovered_skills: Vec<String>,

    pub verdict: String,
}

/// Outcome of a coding challenge or interview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub kind: ValidationKind,

    /// The challenge that was graded; `None` for interviews
    pub challenge: Option<SkillChallenge>,

    pub result: ValidationResult,

    pub verdict: String,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    CodingChallenge,
    Interview,
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationKind::CodingChallenge => write!(f, "Coding Challenge"),
            ValidationKind::Interview => write!(f, "Interview"),
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,

    pub version: String,

    pub processing_time_ms: u64,

    /// Embedding model, when one was involved
    pub embedding_model: Option<String>,
}

impl ReportMetadata {
    pub fn new(processing_time_ms: u64, embedding_model: Option<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            processing_time_ms,
            embedding_model,
        }
    }
}

impl MatchReport {
    /// Build a report from ranked results. Results whose candidate is not
    /// in `candidates` are listed under their id.
    pub fn new(
        job: JobPosting,
        results: Vec<MatchResult>,
        candidates: &[CandidateProfile],
        candidates_indexed: usize,
        metadata: ReportMetadata,
    ) -> Self {
        let matches: Vec<RankedCandidate> = results
            .into_iter()
            .enumerate()
            .map(|(i, result)| {
                let profile = candidates.iter().find(|c| c.id == result.candidate_id);
                RankedCandidate {
                    rank: i + 1,
                    name: profile.map_or_else(|| result.candidate_id.clone(), |p| p.name.clone()),
                    experience_years: profile.map_or(0, |p| p.experience_years),
                    location: profile.map_or_else(String::new, |p| p.location.clone()),
                    result,
                }
            })
            .collect();

        let uncovered_skills = job
            .required_skills
            .iter()
            .filter(|skill| !matches.iter().any(|m| m.result.matching_skills.contains(*skill)))
            .cloned()
            .collect();

        let best_score = matches.first().map(|m| m.result.score);
        let verdict = match best_score {
            None => "No candidates met the experience requirement".to_string(),
            Some(score) => match_verdict(score).to_string(),
        };

        let summary = MatchSummary {
            candidates_indexed,
            candidates_returned: matches.len(),
            best_score,
            uncovered_skills,
            verdict,
        };

        Self {
            job,
            matches,
            summary,
            metadata,
        }
    }
}

impl ValidationReport {
    pub fn coding(challenge: SkillChallenge, result: ValidationResult, metadata: ReportMetadata) -> Self {
        Self {
            kind: ValidationKind::CodingChallenge,
            challenge: Some(challenge),
            verdict: validation_verdict(result.score).to_string(),
            result,
            metadata,
        }
    }

    pub fn interview(result: ValidationResult, metadata: ReportMetadata) -> Self {
        Self {
            kind: ValidationKind::Interview,
            challenge: None,
            verdict: validation_verdict(result.score).to_string(),
            result,
            metadata,
        }
    }
}

/// Composite scores sit around cosine similarity plus small skill bonuses.
fn match_verdict(score: f32) -> &'static str {
    match score {
        s if s >= 0.9 => "Excellent match - strong shortlist",
        s if s >= 0.75 => "Good match - worth a screening call",
        s if s >= 0.6 => "Fair match - review skills gaps",
        _ => "Weak match - consider widening the search",
    }
}

fn validation_verdict(score: f32) -> &'static str {
    match score as u32 {
        90..=100 => "Excellent",
        70..=89 => "Good",
        50..=69 => "Fair",
        _ => "Needs improvement",
    }
}
