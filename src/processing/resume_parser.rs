//! Resume feature extraction: raw resume text to a structured candidate profile

use crate::config::SkillsConfig;
use crate::error::Result;
use crate::input::text_extractor::extract_text;
use crate::models::{CandidateProfile, DEFAULT_LOCATION};
use crate::processing::skills::SkillMatcher;
use chrono::Datelike;
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use uuid::Uuid;

/// Years assumed for a degree when estimating experience from dates
const DEGREE_YEARS: i32 = 2;
const MAX_EDUCATION_ENTRIES: usize = 3;
const MAX_SUMMARY_SKILLS: usize = 10;

const EDUCATION_KEYWORDS: [&str; 12] = [
    "university", "college", "institute", "school", "phd", "msc", "bsc", "ms", "bs", "bachelor", "master",
    "doctorate",
];

pub struct ResumeParser {
    skill_matcher: SkillMatcher,
    experience_patterns: Vec<Regex>,
    year_regex: Regex,
    location_patterns: Vec<Regex>,
}

impl Default for ResumeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResumeParser {
    pub fn new() -> Self {
        Self::with_skill_matcher(SkillMatcher::default())
    }

    /// Spot the configured custom skills alongside the built-in taxonomy.
    pub fn from_config(config: &SkillsConfig) -> Result<Self> {
        let matcher = SkillMatcher::with_custom_skills(config.custom.clone())?;
        Ok(Self::with_skill_matcher(matcher))
    }

    pub fn with_skill_matcher(skill_matcher: SkillMatcher) -> Self {
        let experience_patterns = [
            r"(\d+)[+\s]*years?\s+(?:of\s+)?experience",
            r"experience[:\s]+(\d+)[+\s]*years?",
            r"(\d+)[+\s]*yrs?\s+experience",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid experience regex"))
        .collect();

        let year_regex = Regex::new(r"\b(?:19|20)\d{2}\b").expect("Invalid year regex");

        let location_patterns = [
            r"([A-Z][a-z]+,\s*[A-Z]{2})",     // City, STATE
            r"([A-Z][a-z]+,\s*[A-Z][a-z]+)", // City, Country
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid location regex"))
        .collect();

        Self {
            skill_matcher,
            experience_patterns,
            year_regex,
            location_patterns,
        }
    }

    /// Decode uploaded bytes; see [`extract_text`] for the fallback rules.
    pub fn extract(&self, raw: &[u8], filename: &str) -> String {
        extract_text(raw, filename)
    }

    /// Run the whole pipeline over an uploaded resume.
    pub fn parse(&self, raw: &[u8], filename: &str) -> Result<CandidateProfile> {
        let text = self.extract(raw, filename);
        Ok(self.profile_from_text(&text, filename))
    }

    pub fn profile_from_text(&self, text: &str, filename: &str) -> CandidateProfile {
        let skills = self.extract_skills(text);
        let experience_years = self.extract_experience_years(text);
        let summary = self.generate_summary(text, &skills, experience_years);

        let profile = CandidateProfile {
            id: Uuid::new_v4().to_string(),
            name: Self::extract_name(text, filename),
            experience_years,
            education: self.extract_education(text),
            location: self.extract_location(text),
            summary,
            skills,
        };

        debug!(
            "Parsed '{}': {} skills, {} years, location {}",
            filename,
            profile.skills.len(),
            profile.experience_years,
            profile.location
        );
        profile
    }

    pub fn extract_skills(&self, text: &str) -> BTreeSet<String> {
        self.skill_matcher.find_skills(text)
    }

    pub fn extract_experience_years(&self, text: &str) -> u32 {
        self.extract_experience_years_at(text, chrono::Local::now().year())
    }

    /// Same as [`Self::extract_experience_years`] with an explicit current year.
    pub fn extract_experience_years_at(&self, text: &str, current_year: i32) -> u32 {
        let lowered = text.to_lowercase();

        for pattern in &self.experience_patterns {
            let years = pattern
                .captures(&lowered)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok());
            if let Some(years) = years {
                return years;
            }
        }

        // No stated experience: estimate from the oldest date mentioned
        let earliest = self
            .year_regex
            .find_iter(text)
            .filter_map(|m| m.as_str().parse::<i32>().ok())
            .min();

        match earliest {
            Some(year) => (current_year - year - DEGREE_YEARS).max(0) as u32,
            None => 0,
        }
    }

    pub fn extract_education(&self, text: &str) -> Vec<String> {
        text.lines()
            .filter(|line| {
                let lowered = line.to_lowercase();
                EDUCATION_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
            })
            .map(|line| line.trim().to_string())
            .take(MAX_EDUCATION_ENTRIES)
            .collect()
    }

    pub fn extract_location(&self, text: &str) -> String {
        self.location_patterns
            .iter()
            .find_map(|pattern| pattern.find(text))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
    }

    pub fn generate_summary(&self, _text: &str, skills: &BTreeSet<String>, experience_years: u32) -> String {
        let skill_str = skills
            .iter()
            .take(MAX_SUMMARY_SKILLS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "AI/ML professional with {} years experience. Skills: {}",
            experience_years, skill_str
        )
    }

    /// First non-empty line up to any separator, else the file stem.
    fn extract_name(text: &str, filename: &str) -> String {
        let from_header = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| line.split([',', '|']).next())
            .map(str::trim)
            .filter(|name| !name.is_empty() && name.chars().count() <= 60);

        match from_header {
            Some(name) => name.to_string(),
            None => Path::new(filename)
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .filter(|stem| !stem.is_empty())
                .unwrap_or_else(|| "Unknown Candidate".to_string()),
        }
    }
}
