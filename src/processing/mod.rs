//! Candidate processing, indexing and matching

pub mod skills;
pub mod resume_parser;
pub mod embeddings;
pub mod vector_index;
pub mod repository;
pub mod matcher;

pub use matcher::MatchingEngine;
