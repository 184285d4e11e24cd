use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{QuestionPurpose, ValidationType};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub purpose: QuestionPurpose,
    pub question_text: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
}

/// A configured answer rule. `value` is interpreted per `validation_type`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionValidation {
    pub id: i64,
    pub question_id: i64,
    pub validation_type: ValidationType,
    pub value: Option<String>,
}

/// A question with its option set and answer rules.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<QuestionOption>,
    pub validations: Vec<QuestionValidation>,
}

impl QuestionDetail {
    #[must_use]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    #[must_use]
    pub fn rule(&self, validation_type: ValidationType) -> Option<&QuestionValidation> {
        self.validations
            .iter()
            .find(|v| v.validation_type == validation_type)
    }
}

/// A stored answer. Option answers produce one row per selected option.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub question_option_id: Option<i64>,
    pub custom_value: String,
    #[serde(rename = "fileURL")]
    pub file_url: Option<String>,
}
