//! Configuration management for the matching engine

use crate::error::{Result, SkillMatchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
    pub matching: MatchingConfig,
    pub validation: ValidationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// HuggingFace repo id or local folder of a Model2Vec model
    pub model: String,
    pub normalize: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Extra skill names spotted in resumes on top of the built-in taxonomy
    #[serde(default)]
    pub custom: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Added to the similarity once per shared skill
    pub skill_bonus: f32,
    pub default_top_k: usize,
    /// Neighbours requested per wanted result; 1 keeps the plain top-k request
    pub overfetch_factor: usize,
    pub senior_years: u32,
    pub mid_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    First,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraderKind {
    Keyword,
    Execution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub selection: SelectionPolicy,
    pub grader: GraderKind,
    pub interpreter: String,
    pub execution_timeout_secs: u64,
    pub interview_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            skill_bonus: 0.05,
            default_top_k: 10,
            overfetch_factor: 1,
            senior_years: 5,
            mid_years: 2,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::First,
            grader: GraderKind::Keyword,
            interpreter: "python3".to_string(),
            execution_timeout_secs: 10,
            interview_timeout_secs: 60,
        }
    }
}

impl ValidationConfig {
    /// Settings for grading a submitted solution. A one-shot evaluation
    /// has no record of which challenge was shown, so it always grades
    /// against the first one in the bank.
    pub fn for_evaluation(&self) -> Self {
        Self {
            selection: SelectionPolicy::First,
            ..self.clone()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig {
                model: "minishlab/potion-base-8M".to_string(),
                normalize: true,
                timeout_secs: 30,
            },
            skills: SkillsConfig::default(),
            matching: MatchingConfig::default(),
            validation: ValidationConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SkillMatchError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillMatchError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skillmatch")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("embedding.timeout_secs", self.embedding.timeout_secs),
            ("validation.execution_timeout_secs", self.validation.execution_timeout_secs),
            ("validation.interview_timeout_secs", self.validation.interview_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(SkillMatchError::Configuration(format!("{} must be at least 1", name)));
        }

        let m = &self.matching;
        if !m.skill_bonus.is_finite() || m.skill_bonus < 0.0 {
            return Err(SkillMatchError::Configuration(format!(
                "matching.skill_bonus must be a non-negative number, got {}",
                m.skill_bonus
            )));
        }
        if m.default_top_k == 0 {
            return Err(SkillMatchError::Configuration(
                "matching.default_top_k must be at least 1".to_string(),
            ));
        }
        if m.overfetch_factor == 0 {
            return Err(SkillMatchError::Configuration(
                "matching.overfetch_factor must be at least 1".to_string(),
            ));
        }
        if m.mid_years > m.senior_years {
            return Err(SkillMatchError::Configuration(format!(
                "matching.mid_years ({}) exceeds matching.senior_years ({})",
                m.mid_years, m.senior_years
            )));
        }
        if self.validation.interpreter.trim().is_empty() {
            return Err(SkillMatchError::Configuration(
                "validation.interpreter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.matching.skill_bonus, 0.05);
        assert_eq!(config.validation.selection, SelectionPolicy::First);
    }

    #[test]
    fn test_round_trip_through_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.matching.overfetch_factor = 3;
        config.validation.selection = SelectionPolicy::Random;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.matching.overfetch_factor, 3);
        assert_eq!(loaded.validation.selection, SelectionPolicy::Random);
        assert_eq!(loaded.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_rejects_inverted_tiers() {
        let mut config = Config::default();
        config.matching.mid_years = 7;
        assert!(matches!(config.validate(), Err(SkillMatchError::Configuration(_))));
    }

    #[test]
    fn test_rejects_zero_overfetch() {
        let mut config = Config::default();
        config.matching.overfetch_factor = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        let mut config = Config::default();
        config.embedding.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(SkillMatchError::Configuration(msg)) if msg.contains("embedding.timeout_secs")));

        let mut config = Config::default();
        config.validation.interview_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.validation.execution_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_skills_section_is_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut value = toml::Value::try_from(Config::default()).unwrap();
        value.as_table_mut().unwrap().remove("skills");
        std::fs::write(&path, toml::to_string(&value).unwrap()).unwrap();
        assert!(Config::load_from(&path).unwrap().skills.custom.is_empty());

        let mut config = Config::default();
        config.skills.custom = vec!["Polars".to_string()];
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().skills.custom, vec!["Polars"]);
    }

    #[test]
    fn test_evaluation_always_uses_first_challenge() {
        let mut validation = ValidationConfig::default();
        validation.selection = SelectionPolicy::Random;
        validation.interview_timeout_secs = 5;

        let evaluation = validation.for_evaluation();
        assert_eq!(evaluation.selection, SelectionPolicy::First);
        assert_eq!(evaluation.interview_timeout_secs, 5);
    }

    #[test]
    fn test_unparseable_file_is_configuration_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "matching = 12").unwrap();

        assert!(matches!(Config::load_from(&path), Err(SkillMatchError::Configuration(_))));
    }
}
