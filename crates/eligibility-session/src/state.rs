use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::{Answer, AnswerValue};
use crate::user_data::UserData;

/// Everything a questionnaire session has accumulated so far.
///
/// Serialized form matches the session document read by the CLI:
/// `{"answers": [...], "currentStep": 0, "userData": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    /// Ordered by the time each question was first answered.
    pub answers: Vec<Answer>,
    pub current_step: usize,
    pub user_data: UserData,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|answer| answer.question_id == question_id)
            .map(|answer| &answer.value)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
