//! Skill taxonomy and case-insensitive skill spotting

use crate::error::{Result, SkillMatchError};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    Languages,
    Frameworks,
    MachineLearning,
    DataEngineering,
    Infrastructure,
    Custom,
}

/// Finds taxonomy skills anywhere in a block of text.
///
/// Matching is substring based, so "PySpark" reports both "PySpark" and
/// "Spark". Very short skill names would match inside ordinary words,
/// so the default taxonomy spells those out ("Retrieval-Augmented Generation"
/// rather than "RAG").
pub struct SkillMatcher {
    automaton: AhoCorasick,
    taxonomy: Vec<(String, SkillCategory)>,
}

impl SkillMatcher {
    pub fn new() -> Result<Self> {
        Self::with_custom_skills(Vec::new())
    }

    pub fn with_custom_skills(additional_skills: Vec<String>) -> Result<Self> {
        let mut taxonomy = Self::default_taxonomy();
        for skill in additional_skills {
            let skill = skill.trim().to_string();
            if skill.is_empty() || taxonomy.iter().any(|(s, _)| s.eq_ignore_ascii_case(&skill)) {
                continue;
            }
            taxonomy.push((skill, SkillCategory::Custom));
        }

        let patterns: Vec<&str> = taxonomy.iter().map(|(s, _)| s.as_str()).collect();
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| SkillMatchError::InvalidInput(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self { automaton, taxonomy })
    }

    /// Every taxonomy skill that occurs in `text`, spelled as in the taxonomy.
    pub fn find_skills(&self, text: &str) -> BTreeSet<String> {
        self.automaton
            .find_overlapping_iter(text)
            .map(|mat| self.taxonomy[mat.pattern().as_usize()].0.clone())
            .collect()
    }

    pub fn category_of(&self, skill: &str) -> Option<SkillCategory> {
        self.taxonomy
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(skill))
            .map(|(_, category)| *category)
    }

    fn default_taxonomy() -> Vec<(String, SkillCategory)> {
        let groups: [(SkillCategory, &[&str]); 5] = [
            (
                SkillCategory::Languages,
                &["Python", "Java", "Scala", "Julia", "C++", "SQL", "JavaScript", "TypeScript", "Rust", "Golang", "MATLAB"],
            ),
            (
                SkillCategory::Frameworks,
                &[
                    "PyTorch", "TensorFlow", "Keras", "JAX", "scikit-learn", "Hugging Face", "Transformers",
                    "LangChain", "XGBoost", "LightGBM", "OpenCV", "spaCy", "NLTK", "Pandas", "NumPy",
                ],
            ),
            (
                SkillCategory::MachineLearning,
                &[
                    "Machine Learning", "Deep Learning", "NLP", "Natural Language Processing", "Computer Vision",
                    "Reinforcement Learning", "LLM", "Generative AI", "MLOps", "Data Science", "Statistics",
                    "Time Series", "Recommender Systems", "Fine-tuning", "Retrieval-Augmented Generation",
                ],
            ),
            (
                SkillCategory::DataEngineering,
                &["Spark", "PySpark", "Hadoop", "Kafka", "Airflow", "dbt", "Snowflake", "BigQuery", "ETL"],
            ),
            (
                SkillCategory::Infrastructure,
                &[
                    "AWS", "GCP", "Azure", "Docker", "Kubernetes", "MLflow", "Kubeflow", "SageMaker", "FAISS",
                    "Pinecone", "CUDA", "GitHub Actions",
                ],
            ),
        ];

        groups
            .iter()
            .flat_map(|(category, skills)| skills.iter().map(move |s| (s.to_string(), *category)))
            .collect()
    }
}

impl Default for SkillMatcher {
    fn default() -> Self {
        Self::new().expect("Failed to create default skill matcher")
    }
}
