use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MAX_DESCRIPTION_LEN, Validate, positive, positive_all, require_text};
use crate::enums::{QuestionPurpose, ValidationType};
use crate::errors::CoreError;

/// One submitted answer. Option questions use `questionOptionId`, free-text
/// questions use `customValue` (plain text or a base64 image).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: i64,
    pub question_option_id: Option<Vec<i64>>,
    pub custom_value: Option<String>,
}

impl AnswerInput {
    #[must_use]
    pub fn option_ids(&self) -> &[i64] {
        self.question_option_id.as_deref().unwrap_or_default()
    }

    /// Free-text value, `None` when absent or empty.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.custom_value.as_deref().filter(|v| !v.is_empty())
    }
}

impl Validate for AnswerInput {
    fn validate(&self) -> Result<(), CoreError> {
        positive("questionId", self.question_id)?;
        positive_all("questionOptionId", self.option_ids())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationInput {
    pub validation_type: ValidationType,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub purpose: QuestionPurpose,
    pub question_text: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub validations: Vec<ValidationInput>,
}

impl Validate for QuestionPayload {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("questionText", &self.question_text, MAX_DESCRIPTION_LEN)?;
        for option in &self.options {
            require_text("options", option, MAX_DESCRIPTION_LEN)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
    pub purpose: QuestionPurpose,
}

impl Validate for QuestionQuery {
    fn validate(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
