//! Pre-authored debugging challenges

use crate::config::SelectionPolicy;
use crate::models::{ChallengeType, RubricFeedback, SkillChallenge};
use uuid::Uuid;

/// A challenge as authored, before it is issued with an id.
#[derive(Debug, Clone)]
pub struct ChallengeTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub content: &'static str,
    pub expected_output: &'static str,
    pub rubric: &'static [&'static str],
    /// Grader feedback for all, some and none of the rubric found
    pub feedback: [&'static str; 3],
}

impl ChallengeTemplate {
    pub fn issue(&self) -> SkillChallenge {
        SkillChallenge {
            id: Uuid::new_v4().to_string(),
            challenge_type: ChallengeType::Coding,
            title: self.title.to_string(),
            description: self.description.to_string(),
            content: self.content.to_string(),
            expected_output: self.expected_output.to_string(),
            rubric: self.rubric.iter().map(|k| k.to_string()).collect(),
            feedback: RubricFeedback {
                all_found: self.feedback[0].to_string(),
                partial: self.feedback[1].to_string(),
                none_found: self.feedback[2].to_string(),
            },
        }
    }
}

const TRAINING_LOOP_CONTENT: &str = r#"
import torch
import torch.nn as nn

# Bug: the loss is computed but the weights never change
def train_model(model, data_loader, criterion, optimizer, epochs=10):
    for epoch in range(epochs):
        for batch_idx, (data, target) in enumerate(data_loader):
            output = model(data)
            loss = criterion(output, target)
            loss.backward()

        print(f'Epoch {epoch}, Loss: {loss.item()}')

# What's missing to make this training loop work?
"#;

const BINARY_CLASSIFIER_CONTENT: &str = r#"
# Model is getting 50% accuracy on binary classification
# What could be wrong?

model = nn.Sequential(
    nn.Linear(784, 10),
    nn.ReLU(),
    nn.Linear(10, 1),
    nn.Sigmoid()
)

criterion = nn.CrossEntropyLoss()
"#;

const DEFAULT_BANK: [ChallengeTemplate; 2] = [
    ChallengeTemplate {
        title: "PyTorch Debug Challenge",
        description: "Fix the training loop that won't converge",
        content: TRAINING_LOOP_CONTENT,
        expected_output: "optimizer.step() and optimizer.zero_grad()",
        rubric: &["optimizer.step", "zero_grad"],
        feedback: [
            "Excellent! You correctly identified both missing components.",
            "Good! You found one issue, but there's another missing piece.",
            "The training loop is missing key optimizer calls.",
        ],
    },
    ChallengeTemplate {
        title: "Model Performance Debug",
        description: "Identify why this model has poor accuracy",
        content: BINARY_CLASSIFIER_CONTENT,
        expected_output: "Change output layer to 2 neurons and remove Sigmoid, or use BCELoss with 1 output",
        rubric: &["sigmoid", "bceloss"],
        feedback: [
            "Excellent! The Sigmoid output clashes with CrossEntropyLoss, and BCELoss fixes it.",
            "Good! You are close, but tie the Sigmoid output to the right loss function.",
            "The output activation and the loss function don't fit together.",
        ],
    },
];

pub struct ChallengeBank {
    templates: Vec<ChallengeTemplate>,
}

impl Default for ChallengeBank {
    fn default() -> Self {
        Self {
            templates: DEFAULT_BANK.to_vec(),
        }
    }
}

impl ChallengeBank {
    /// `templates` must not be empty.
    pub fn with_templates(templates: Vec<ChallengeTemplate>) -> Option<Self> {
        if templates.is_empty() {
            None
        } else {
            Some(Self { templates })
        }
    }

    pub fn pick(&self, policy: SelectionPolicy) -> &ChallengeTemplate {
        let index = match policy {
            SelectionPolicy::First => 0,
            SelectionPolicy::Random => (Uuid::new_v4().as_u128() % self.templates.len() as u128) as usize,
        };
        &self.templates[index]
    }

    pub fn templates(&self) -> &[ChallengeTemplate] {
        &self.templates
    }
}
