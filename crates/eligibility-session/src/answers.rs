use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Scalar value recorded for a question. Enumerated choices travel as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
}

impl AnswerValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Flag(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Flag(flag) => Some(*flag),
            AnswerValue::Text(_) => None,
        }
    }

    /// Empty text and `false` carry no information for payload derivation.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Flag(flag) => !flag,
            AnswerValue::Text(text) => text.is_empty(),
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Flag(flag) => write!(f, "{flag}"),
            AnswerValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Flag(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

/// One question id paired with the value the user gave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub value: AnswerValue,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        Self {
            question_id: question_id.into(),
            value: value.into(),
        }
    }
}
