//! Prompt used to have a language model assess an interview

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct InterviewPrompt {
    pub template: String,
}

impl Default for InterviewPrompt {
    fn default() -> Self {
        Self {
            template: INTERVIEW_TEMPLATE.to_string(),
        }
    }
}

/// Parameters for prompt template substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewParams {
    pub candidate_id: String,
    pub scenario: String,
}

impl InterviewPrompt {
    pub fn render(&self, params: &InterviewParams) -> String {
        self.template
            .replace("{candidate_id}", &params.candidate_id)
            .replace("{scenario}", params.scenario.trim())
    }
}

const INTERVIEW_TEMPLATE: &str = r#"TASK: Evaluate the candidate's soft skills from the interview scenario below.

<CANDIDATE>
{candidate_id}
</CANDIDATE>

<SCENARIO>
{scenario}
</SCENARIO>

Assess communication clarity, technical explanation without excessive jargon,
confidence and professionalism.

Respond with exactly two lines:
SCORE: <number from 0 to 100>
FEEDBACK: <one paragraph of feedback for the hiring team>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_params() {
        let prompt = InterviewPrompt::default().render(&InterviewParams {
            candidate_id: "cand-42".to_string(),
            scenario: "  Explain gradient descent to a product manager.\n".to_string(),
        });

        assert!(prompt.contains("<CANDIDATE>\ncand-42\n</CANDIDATE>"));
        assert!(prompt.contains("<SCENARIO>\nExplain gradient descent to a product manager.\n</SCENARIO>"));
        assert!(!prompt.contains("{scenario}"));
    }

    #[test]
    fn test_template_asks_for_parseable_answer() {
        let prompt = InterviewPrompt::default();
        assert!(prompt.template.contains("SCORE:"));
        assert!(prompt.template.contains("FEEDBACK:"));
    }
}
