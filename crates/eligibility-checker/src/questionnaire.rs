use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

const DEFAULT_QUESTIONNAIRE: &str = include_str!("../assets/questionnaire.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Questionnaire {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    Choice { choices: Vec<String> },
    Boolean,
    Text,
}

impl Questionnaire {
    /// The questionnaire shipped with the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(DEFAULT_QUESTIONNAIRE).context("embedded questionnaire is invalid")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::embedded();
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read questionnaire {}", path.display()))?;
        let questionnaire = Self::from_json_str(&raw)
            .with_context(|| format!("invalid questionnaire {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            questions = questionnaire.questions.len(),
            "loaded questionnaire"
        );
        Ok(questionnaire)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let questionnaire: Self = serde_json::from_str(raw)?;
        questionnaire.validate()?;
        Ok(questionnaire)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for question in &self.questions {
            if question.id.trim().is_empty() {
                bail!("question '{}' has an empty id", question.title);
            }
            if !seen.insert(question.id.as_str()) {
                bail!("duplicate question id '{}'", question.id);
            }
            if let QuestionKind::Choice { choices } = &question.kind
                && choices.is_empty()
            {
                bail!("choice question '{}' lists no choices", question.id);
            }
        }
        Ok(())
    }
}
