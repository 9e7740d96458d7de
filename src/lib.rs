//! Skillmatch library: semantic candidate matching and skill validation

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod processing;
pub mod validation;
pub mod output;

pub use error::{Result, SkillMatchError};
pub use config::Config;
pub use models::{CandidateProfile, JobPosting, MatchResult, SkillChallenge, ValidationResult};
pub use processing::MatchingEngine;
pub use validation::SkillValidationEngine;
