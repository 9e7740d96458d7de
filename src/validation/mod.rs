//! Skill validation: challenge bank, graders and interviews

pub mod challenges;
pub mod grader;
pub mod prompts;
pub mod interview;
pub mod engine;

pub use engine::SkillValidationEngine;
