//! Step flows a user works through to finish a challenge.
//!
//! The number of answered steps drives the performance ratio used by the
//! dynamic XP formula.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::QuestError;

const DEFAULT_STEP_DATA: &str = include_str!("../data/steps.json");
const DEFAULT_RATING_SCALE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Selection,
    MultiSelection,
    Rating,
    TextInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeStep {
    pub id: String,
    pub kind: StepKind,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<StepOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// A user's answer to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choices(Vec<String>),
    Rating(u32),
    Text(String),
}

impl Answer {
    /// Empty text and empty choice lists do not count as answered; text that
    /// is only whitespace does.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Choices(choices) => !choices.is_empty(),
            Self::Rating(_) => true,
            Self::Text(text) => !text.is_empty(),
        }
    }
}

/// Answers keyed by step id.
pub type ChallengeAnswers = BTreeMap<String, Answer>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("`{value}` is not an option of step `{step}`")]
    UnknownOption { step: String, value: String },
    #[error("step `{step}` expects a rating from 1 to {scale}, got `{value}`")]
    InvalidRating {
        step: String,
        value: String,
        scale: u32,
    },
}

impl ChallengeStep {
    #[must_use]
    pub fn rating_scale(&self) -> u32 {
        self.scale.unwrap_or(DEFAULT_RATING_SCALE).max(1)
    }

    fn check_option(&self, value: &str) -> Result<(), AnswerError> {
        if self.options.is_empty() || self.options.iter().any(|o| o.id == value) {
            Ok(())
        } else {
            Err(AnswerError::UnknownOption {
                step: self.id.clone(),
                value: value.to_string(),
            })
        }
    }

    /// Interpret free-form input (a CLI flag, a form field) for this step.
    /// Multi-selection input is comma separated.
    ///
    /// # Errors
    ///
    /// Returns an error for options the step does not offer or ratings
    /// outside the step's scale.
    pub fn parse_answer(&self, raw: &str) -> Result<Answer, AnswerError> {
        match self.kind {
            StepKind::Selection => {
                let value = raw.trim();
                if !value.is_empty() {
                    self.check_option(value)?;
                }
                Ok(Answer::Text(value.to_string()))
            }
            StepKind::MultiSelection => {
                let choices = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(|c| self.check_option(c).map(|()| c.to_string()))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Answer::Choices(choices))
            }
            StepKind::Rating => {
                let scale = self.rating_scale();
                match raw.trim().parse::<u32>() {
                    Ok(value) if (1..=scale).contains(&value) => Ok(Answer::Rating(value)),
                    _ => Err(AnswerError::InvalidRating {
                        step: self.id.clone(),
                        value: raw.to_string(),
                        scale,
                    }),
                }
            }
            StepKind::TextInput => Ok(Answer::Text(raw.to_string())),
        }
    }
}

/// Number of `steps` the user answered.
#[must_use]
pub fn answered_count(steps: &[ChallengeStep], answers: &ChallengeAnswers) -> usize {
    steps
        .iter()
        .filter(|step| answers.get(&step.id).is_some_and(Answer::is_answered))
        .count()
}

/// Steps for every challenge whose title contains `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFlow {
    pub title: String,
    pub steps: Vec<ChallengeStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StepCatalog {
    #[serde(default)]
    pub flows: Vec<StepFlow>,
    #[serde(default)]
    pub default_steps: Vec<ChallengeStep>,
}

impl StepCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_STEP_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<StepCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns [`QuestError::Config`] if the JSON cannot be parsed into
    /// a step catalog.
    pub fn from_json(json: &str) -> Result<Self, QuestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The first flow whose title fragment appears in `challenge_title`,
    /// falling back to the generic steps.
    #[must_use]
    pub fn steps_for(&self, challenge_title: &str) -> &[ChallengeStep] {
        self.flows
            .iter()
            .find(|flow| challenge_title.contains(flow.title.as_str()))
            .map_or(self.default_steps.as_slice(), |flow| flow.steps.as_slice())
    }
}
