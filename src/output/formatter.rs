//! Output formatters: console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::models::{CandidateProfile, SkillChallenge};
use crate::output::report::*;
use colored::{Color, Colorize};
use std::path::Path;

/// Renders everything the CLI prints in one output format.
pub trait OutputFormatter {
    fn format_match_report(&self, report: &MatchReport) -> Result<String>;
    fn format_validation_report(&self, report: &ValidationReport) -> Result<String>;
    fn format_profile(&self, profile: &CandidateProfile) -> Result<String>;
    fn format_challenge(&self, challenge: &SkillChallenge) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON formatter for piping into other tools
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for sharing shortlists
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn join_skills<'a>(skills: impl IntoIterator<Item = &'a String>) -> String {
    let skills: Vec<&str> = skills.into_iter().map(String::as_str).collect();
    if skills.is_empty() {
        "none".to_string()
    } else {
        skills.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    /// Badge for a 0-100 validation score
    fn format_score_badge(&self, score: f32) -> String {
        let (badge, color) = match score as u32 {
            90..=100 => ("EXCELLENT", Color::Green),
            70..=89 => ("GOOD", Color::Yellow),
            50..=69 => ("FAIR", Color::BrightYellow),
            _ => ("NEEDS WORK", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_generated(&self, metadata: &ReportMetadata) -> String {
        format!(
            "Generated: {} | Processing time: {}ms\n",
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            metadata.processing_time_ms
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_match_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("CANDIDATE MATCHES: {}", report.job.title), 1));
        output.push_str(&self.format_generated(&report.metadata));
        if let Some(model) = &report.metadata.embedding_model {
            output.push_str(&format!("Embedding model: {}\n", model));
        }

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Indexed: {} | Returned: {}\n",
            report.summary.candidates_indexed, report.summary.candidates_returned
        ));
        if let Some(best) = report.summary.best_score {
            output.push_str(&format!("Best score: {:.2}\n", best));
        }
        output.push_str(&format!("Verdict: {}\n", self.colorize(&report.summary.verdict, Color::Cyan)));
        if !report.summary.uncovered_skills.is_empty() {
            output.push_str(&format!(
                "Uncovered skills: {}\n",
                self.colorize(&report.summary.uncovered_skills.join(", "), Color::Red)
            ));
        }

        if report.matches.is_empty() {
            return Ok(output);
        }

        output.push_str(&self.format_header("Ranked Candidates", 2));
        for candidate in &report.matches {
            output.push_str(&format!(
                "{}. {} ({} yrs, {})\n",
                candidate.rank,
                self.colorize(&candidate.name, Color::BrightWhite),
                candidate.experience_years,
                candidate.location
            ));
            output.push_str(&format!(
                "   Matching skills: {}\n",
                self.colorize(&join_skills(&candidate.result.matching_skills), Color::Green)
            ));
            output.push_str(&format!("   {}\n", candidate.result.explanation));
        }

        Ok(output)
    }

    fn format_validation_report(&self, report: &ValidationReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("SKILL VALIDATION: {}", report.kind), 1));
        output.push_str(&self.format_generated(&report.metadata));

        if let Some(challenge) = &report.challenge {
            output.push_str(&format!("Challenge: {} ({})\n", challenge.title, challenge.id));
        }
        if !report.result.candidate_id.is_empty() {
            output.push_str(&format!("Candidate: {}\n", report.result.candidate_id));
        }

        output.push_str(&self.format_header("Result", 2));
        output.push_str(&format!(
            "Score: {:.0}/100 {}\n",
            report.result.score,
            self.format_score_badge(report.result.score)
        ));
        output.push_str(&format!("Verdict: {}\n", self.colorize(&report.verdict, Color::Cyan)));
        output.push_str(&format!("Feedback: {}\n", report.result.feedback));
        if let Some(secs) = report.result.time_taken {
            output.push_str(&format!("Time taken: {}s\n", secs));
        }

        Ok(output)
    }

    fn format_profile(&self, profile: &CandidateProfile) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("CANDIDATE PROFILE: {}", profile.name), 1));
        output.push_str(&format!("Id: {}\n", profile.id));
        output.push_str(&format!("Experience: {} years\n", profile.experience_years));
        output.push_str(&format!("Location: {}\n", profile.location));
        output.push_str(&format!(
            "Skills: {}\n",
            self.colorize(&join_skills(&profile.skills), Color::Green)
        ));

        if !profile.education.is_empty() {
            output.push_str(&self.format_header("Education", 3));
            for line in &profile.education {
                output.push_str(&format!("  • {}\n", line));
            }
        }

        output.push_str(&self.format_header("Summary", 3));
        output.push_str(&format!("{}\n", profile.summary));

        Ok(output)
    }

    fn format_challenge(&self, challenge: &SkillChallenge) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&challenge.title, 1));
        output.push_str(&format!("Id: {} | Type: {}\n", challenge.id, challenge.challenge_type));
        output.push_str(&format!("{}\n", self.colorize(&challenge.description, Color::Cyan)));
        output.push_str(&format!("{}\n", challenge.content.trim_end()));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_match_report(&self, report: &MatchReport) -> Result<String> {
        self.render(report)
    }

    fn format_validation_report(&self, report: &ValidationReport) -> Result<String> {
        self.render(report)
    }

    fn format_profile(&self, profile: &CandidateProfile) -> Result<String> {
        self.render(profile)
    }

    fn format_challenge(&self, challenge: &SkillChallenge) -> Result<String> {
        self.render(challenge)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn format_metadata(&self, metadata: &ReportMetadata) -> String {
        if !self.include_metadata {
            return String::new();
        }
        format!(
            "**Generated:** {} | **Processing Time:** {}ms | **Version:** {}\n\n",
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            metadata.processing_time_ms,
            metadata.version
        )
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_match_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("# Candidate Matches: {}\n\n", report.job.title));
        output.push_str(&self.format_metadata(&report.metadata));

        output.push_str("## Summary\n\n");
        output.push_str(&format!("- **Candidates indexed:** {}\n", report.summary.candidates_indexed));
        output.push_str(&format!("- **Candidates returned:** {}\n", report.summary.candidates_returned));
        output.push_str(&format!(
            "- **Required experience:** {} years\n",
            report.job.years_experience
        ));
        output.push_str(&format!("- **Verdict:** {}\n", report.summary.verdict));
        if !report.summary.uncovered_skills.is_empty() {
            output.push_str(&format!(
                "- **Uncovered skills:** {}\n",
                report.summary.uncovered_skills.join(", ")
            ));
        }
        output.push('\n');

        if report.matches.is_empty() {
            return Ok(output);
        }

        output.push_str("## Ranked Candidates\n\n");
        output.push_str("| Rank | Candidate | Score | Experience | Matching Skills |\n");
        output.push_str("|------|-----------|-------|------------|-----------------|\n");
        for candidate in &report.matches {
            output.push_str(&format!(
                "| {} | {} | {:.2} | {} yrs | {} |\n",
                candidate.rank,
                candidate.name,
                candidate.result.score,
                candidate.experience_years,
                join_skills(&candidate.result.matching_skills)
            ));
        }

        output.push_str("\n### Explanations\n\n");
        for candidate in &report.matches {
            output.push_str(&format!("{}. **{}**: {}\n", candidate.rank, candidate.name, candidate.result.explanation));
        }

        Ok(output)
    }

    fn format_validation_report(&self, report: &ValidationReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("# Skill Validation: {}\n\n", report.kind));
        output.push_str(&self.format_metadata(&report.metadata));

        if let Some(challenge) = &report.challenge {
            output.push_str(&format!("**Challenge:** {} (`{}`)\n\n", challenge.title, challenge.id));
        }
        if !report.result.candidate_id.is_empty() {
            output.push_str(&format!("**Candidate:** `{}`\n\n", report.result.candidate_id));
        }

        output.push_str(&format!("**Score:** {:.0}/100 ({})\n\n", report.result.score, report.verdict));
        output.push_str(&format!("> {}\n", report.result.feedback));
        if let Some(secs) = report.result.time_taken {
            output.push_str(&format!("\n*Time taken: {}s*\n", secs));
        }

        Ok(output)
    }

    fn format_profile(&self, profile: &CandidateProfile) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", profile.name));
        output.push_str(&format!("- **Id:** `{}`\n", profile.id));
        output.push_str(&format!("- **Experience:** {} years\n", profile.experience_years));
        output.push_str(&format!("- **Location:** {}\n", profile.location));
        output.push_str(&format!("- **Skills:** {}\n", join_skills(&profile.skills)));

        if !profile.education.is_empty() {
            output.push_str("\n## Education\n\n");
            for line in &profile.education {
                output.push_str(&format!("- {}\n", line));
            }
        }

        output.push_str(&format!("\n## Summary\n\n{}\n", profile.summary));
        Ok(output)
    }

    fn format_challenge(&self, challenge: &SkillChallenge) -> Result<String> {
        Ok(format!(
            "# {}\n\n*{}* | `{}`\n\n{}\n\n```python\n{}\n```\n",
            challenge.title,
            challenge.challenge_type,
            challenge.id,
            challenge.description,
            challenge.content.trim()
        ))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn formatter(&self, format: &OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn generate_match_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        self.formatter(format).format_match_report(report)
    }

    pub fn generate_validation_report(&self, report: &ValidationReport, format: &OutputFormat) -> Result<String> {
        self.formatter(format).format_validation_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, job_title: &str, timestamp: bool) -> String {
    let base_name: String = job_title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_matches{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_matches{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_matches{}.md", base_name, timestamp_suffix),
    }
}
