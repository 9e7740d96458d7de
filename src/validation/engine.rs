//! Skill validation: coding challenges and soft-skills interviews

use crate::config::{SelectionPolicy, ValidationConfig};
use crate::error::{Result, SkillMatchError};
use crate::models::{SkillChallenge, ValidationResult, INTERVIEW_CHALLENGE_ID};
use crate::processing::repository::Repository;
use crate::validation::challenges::ChallengeBank;
use crate::validation::grader::Grader;
use crate::validation::interview::{InterviewAssessment, Interviewer};
use crate::validation::prompts::{InterviewParams, InterviewPrompt};
use log::{debug, info, warn};
use std::time::Duration;

pub const INTERVIEW_FALLBACK_SCORE: f32 = 50.0;

pub struct SkillValidationEngine<C, G, I> {
    challenges: C,
    grader: G,
    interviewer: I,
    bank: ChallengeBank,
    selection: SelectionPolicy,
    prompt: InterviewPrompt,
    interview_timeout: Duration,
}

impl<C, G, I> SkillValidationEngine<C, G, I>
where
    C: Repository<SkillChallenge>,
    G: Grader,
    I: Interviewer,
{
    pub fn new(challenges: C, grader: G, interviewer: I, config: &ValidationConfig) -> Self {
        Self {
            challenges,
            grader,
            interviewer,
            bank: ChallengeBank::default(),
            selection: config.selection,
            prompt: InterviewPrompt::default(),
            interview_timeout: Duration::from_secs(config.interview_timeout_secs),
        }
    }

    pub fn with_bank(mut self, bank: ChallengeBank) -> Self {
        self.bank = bank;
        self
    }

    /// Issue a challenge from the bank and remember it for grading.
    pub fn create_coding_challenge(&self) -> SkillChallenge {
        let challenge = self.bank.pick(self.selection).issue();
        info!("Created challenge {} ({})", challenge.id, challenge.title);
        self.challenges.put(challenge.clone());
        challenge
    }

    /// Grade `solution` against a previously issued challenge.
    ///
    /// The returned result has an empty `candidate_id`; callers attach it
    /// with [`ValidationResult::with_candidate`].
    pub async fn evaluate_coding_solution(&self, challenge_id: &str, solution: &str) -> Result<ValidationResult> {
        let challenge = self
            .challenges
            .get(challenge_id)
            .ok_or_else(|| SkillMatchError::ChallengeNotFound(challenge_id.to_string()))?;

        let grade = self.grader.grade(&challenge, solution).await?;
        debug!("Challenge {} graded {:.0}", challenge_id, grade.score);

        Ok(ValidationResult::new(
            "",
            challenge.id,
            grade.score,
            grade.feedback,
            grade.time_taken,
        ))
    }

    /// Run a soft-skills interview. Never fails: any error or timeout is
    /// reported as a neutral result so a batch of interviews keeps going.
    pub async fn conduct_ai_interview(&self, candidate_id: &str, scenario: &str) -> ValidationResult {
        match self.interview(candidate_id, scenario).await {
            Ok(assessment) => ValidationResult::new(
                candidate_id,
                INTERVIEW_CHALLENGE_ID,
                assessment.score,
                assessment.feedback,
                Some(assessment.duration_secs),
            ),
            Err(e) => {
                warn!("Interview for candidate {} failed: {}", candidate_id, e);
                ValidationResult::new(
                    candidate_id,
                    INTERVIEW_CHALLENGE_ID,
                    INTERVIEW_FALLBACK_SCORE,
                    format!("Interview could not be completed: {}", e),
                    Some(0),
                )
            }
        }
    }

    async fn interview(&self, candidate_id: &str, scenario: &str) -> Result<InterviewAssessment> {
        if scenario.trim().is_empty() {
            return Err(SkillMatchError::InvalidInput("Interview scenario is empty".to_string()));
        }

        let prompt = self.prompt.render(&InterviewParams {
            candidate_id: candidate_id.to_string(),
            scenario: scenario.to_string(),
        });

        tokio::time::timeout(self.interview_timeout, self.interviewer.assess(&prompt))
            .await
            .map_err(|_| SkillMatchError::Timeout {
                operation: "Interview assessment".to_string(),
                secs: self.interview_timeout.as_secs(),
            })?
    }

    pub fn challenges(&self) -> &C {
        &self.challenges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::repository::InMemoryRepository;
    use crate::validation::grader::KeywordGrader;
    use crate::validation::interview::{LlmInterviewer, SimulatedInterviewer, TextGenerator};

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(SkillMatchError::Generation("model unavailable".to_string()))
        }
    }

    struct StalledInterviewer;

    impl Interviewer for StalledInterviewer {
        async fn assess(&self, _prompt: &str) -> Result<InterviewAssessment> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(SkillMatchError::Generation("unreachable".to_string()))
        }
    }

    fn engine() -> SkillValidationEngine<InMemoryRepository<SkillChallenge>, KeywordGrader, SimulatedInterviewer> {
        SkillValidationEngine::new(
            InMemoryRepository::new(),
            KeywordGrader,
            SimulatedInterviewer,
            &ValidationConfig::default(),
        )
    }

    #[test]
    fn test_created_challenge_is_stored() {
        let engine = engine();
        let challenge = engine.create_coding_challenge();

        assert_eq!(challenge.title, "PyTorch Debug Challenge");
        assert!(engine.challenges().contains(&challenge.id));
        assert_ne!(engine.create_coding_challenge().id, challenge.id);
    }

    #[tokio::test]
    async fn test_evaluate_grades_by_rubric() {
        let engine = engine();
        let challenge = engine.create_coding_challenge();

        let full = engine
            .evaluate_coding_solution(&challenge.id, "added optimizer.step() and optimizer.zero_grad()")
            .await
            .unwrap();
        assert_eq!(full.score, 95.0);
        assert_eq!(full.challenge_id, challenge.id);
        assert!(full.candidate_id.is_empty());

        let partial = engine.evaluate_coding_solution(&challenge.id, "zero_grad").await.unwrap();
        assert_eq!(partial.score, 70.0);

        let none = engine.evaluate_coding_solution(&challenge.id, "fixed the bug").await.unwrap();
        assert_eq!(none.score, 30.0);
    }

    #[test]
    fn test_custom_bank() {
        let bank = ChallengeBank::with_templates(vec![ChallengeBank::default().templates()[1].clone()]).unwrap();
        let challenge = engine().with_bank(bank).create_coding_challenge();

        assert_eq!(challenge.title, "Model Performance Debug");
    }

    #[tokio::test]
    async fn test_evaluate_unknown_challenge() {
        let result = engine().evaluate_coding_solution("no-such-id", "anything").await;

        let err = result.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, SkillMatchError::ChallengeNotFound(id) if id == "no-such-id"));
    }

    #[tokio::test]
    async fn test_simulated_interview() {
        let result = engine().conduct_ai_interview("cand-1", "Explain overfitting").await;

        assert_eq!(result.candidate_id, "cand-1");
        assert_eq!(result.challenge_id, "soft_skills_interview");
        assert_eq!(result.score, 85.0);
        assert_eq!(result.time_taken, Some(300));
    }

    #[tokio::test]
    async fn test_failed_interview_is_neutral() {
        let engine = SkillValidationEngine::new(
            InMemoryRepository::new(),
            KeywordGrader,
            LlmInterviewer::new(FailingGenerator),
            &ValidationConfig::default(),
        );
        let result = engine.conduct_ai_interview("cand-2", "Explain overfitting").await;

        assert_eq!(result.score, 50.0);
        assert_eq!(result.time_taken, Some(0));
        assert_eq!(
            result.feedback,
            "Interview could not be completed: Text generation error: model unavailable"
        );
    }

    #[tokio::test]
    async fn test_empty_scenario_is_neutral() {
        let result = engine().conduct_ai_interview("cand-3", "   ").await;

        assert_eq!(result.score, 50.0);
        assert!(result.feedback.starts_with("Interview could not be completed:"));
    }

    #[tokio::test]
    async fn test_interview_timeout_is_neutral() {
        let config = ValidationConfig {
            interview_timeout_secs: 1,
            ..ValidationConfig::default()
        };
        let engine = SkillValidationEngine::new(InMemoryRepository::new(), KeywordGrader, StalledInterviewer, &config);
        let result = engine.conduct_ai_interview("cand-4", "Explain overfitting").await;

        assert_eq!(result.score, 50.0);
        assert_eq!(result.time_taken, Some(0));
        assert!(result.feedback.contains("timed out"));
    }
}
