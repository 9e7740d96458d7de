//! Error handling for the matching and validation engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillMatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Embedding model not initialized")]
    EmbedderNotInitialized,

    #[error("Challenge not found: {0}")]
    ChallengeNotFound(String),

    #[error("Vector index out of sync with slot map: expected slot {expected}, index returned {actual}")]
    IndexInconsistent { expected: usize, actual: usize },

    #[error("Embedding dimensions don't match: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("Grading error: {0}")]
    Grading(String),

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkillMatchError>;

/// model2vec-rs reports load failures through anyhow
impl From<anyhow::Error> for SkillMatchError {
    fn from(err: anyhow::Error) -> Self {
        SkillMatchError::Embedding(err.to_string())
    }
}

impl SkillMatchError {
    /// True for the client-facing "unknown id" class of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SkillMatchError::ChallengeNotFound(_))
    }
}
