//! Questionnaire answer pipeline shared by vendor rooms and venue checklists.
//!
//! Every submitted answer starts `Pending` and ends `Validated` or
//! `Rejected`:
//!
//! 1. the question exists and belongs to the questionnaire being answered;
//! 2. option questions get option ids from their own option set and no
//!    free text, option-free questions get free text and no option ids;
//! 3. the question's `max_length`, `file_format` and `file_size` rules hold.
//!
//! All answers are checked before anything is uploaded. Image answers are
//! then uploaded and stored as an empty `customValue` plus the object URL.
//! The owner's transaction runs after the uploads; when it fails the caller
//! hands the batch back to [`QuestionnaireService::discard`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use vh_core::entities::QuestionDetail;
use vh_core::enums::{AnswerStatus, QuestionPurpose, ValidationType};
use vh_core::requests::{AnswerInput, QuestionPayload};
use vh_db::VenueDb;
use vh_db::repos::questionnaire::NewAnswer;
use vh_storage::ImageStore;

use super::image::{DecodedImage, allowed_formats, decode_image};
use crate::error::ApiError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A checked answer value, before any upload.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Checked {
    Options(Vec<i64>),
    Text(String),
    Image(DecodedImage),
}

/// Answers ready for the owner's transaction, plus the keys uploaded for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedAnswers {
    pub answers: Vec<NewAnswer>,
    pub uploaded: Vec<String>,
}

#[derive(Clone)]
pub struct QuestionnaireService {
    db: Arc<VenueDb>,
    images: ImageStore,
}

impl QuestionnaireService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, images: ImageStore) -> Self {
        Self { db, images }
    }

    /// Live questions of one questionnaire with their options and rules.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn questions(&self, purpose: QuestionPurpose) -> Result<Vec<QuestionDetail>, ApiError> {
        Ok(self.db.questions_for_purpose(purpose).await?)
    }

    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the insert fails.
    pub async fn create_question(&self, payload: &QuestionPayload) -> Result<i64, ApiError> {
        Ok(self.db.create_question(payload).await?)
    }

    /// Check every answer, then upload image answers.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown question, `Validation` for a rule
    /// violation, and `ContentLoading` if an upload fails (uploads already
    /// made for the batch are deleted first).
    pub async fn prepare(
        &self,
        purpose: QuestionPurpose,
        inputs: &[AnswerInput],
    ) -> Result<PreparedAnswers, ApiError> {
        if inputs.is_empty() {
            return Ok(PreparedAnswers::default());
        }
        let ids: Vec<i64> = inputs.iter().map(|a| a.question_id).collect();
        let questions: HashMap<i64, QuestionDetail> = self
            .db
            .question_bundle(&ids)
            .await?
            .into_iter()
            .map(|q| (q.question.id, q))
            .collect();

        let mut seen = HashSet::new();
        let mut checked = Vec::with_capacity(inputs.len());
        for input in inputs {
            if !seen.insert(input.question_id) {
                return Err(ApiError::Validation(format!(
                    "Question {} is answered more than once",
                    input.question_id
                )));
            }
            let question = questions
                .get(&input.question_id)
                .ok_or_else(|| ApiError::not_found("Question", input.question_id))?;
            let outcome = check_answer(question, purpose, input);
            let status = AnswerStatus::Pending.transition(if outcome.is_ok() {
                AnswerStatus::Validated
            } else {
                AnswerStatus::Rejected
            })?;
            tracing::debug!(question_id = input.question_id, %status, "answer checked");
            checked.push((input.question_id, outcome?));
        }

        let mut prepared = PreparedAnswers::default();
        for (question_id, value) in checked {
            match value {
                Checked::Options(ids) => {
                    prepared.answers.extend(ids.into_iter().map(|option_id| NewAnswer {
                        question_id,
                        question_option_id: Some(option_id),
                        custom_value: String::new(),
                        file_url: None,
                    }));
                }
                Checked::Text(text) => prepared.answers.push(NewAnswer {
                    question_id,
                    question_option_id: None,
                    custom_value: text,
                    file_url: None,
                }),
                Checked::Image(image) => {
                    let key = self.images.new_key(purpose);
                    let url = match self
                        .images
                        .upload_image(&key, image.bytes, image.format.content_type())
                        .await
                    {
                        Ok(url) => url,
                        Err(error) => {
                            self.discard(&prepared).await;
                            return Err(error.into());
                        }
                    };
                    prepared.uploaded.push(key);
                    prepared.answers.push(NewAnswer {
                        question_id,
                        question_option_id: None,
                        custom_value: String::new(),
                        file_url: Some(url),
                    });
                }
            }
        }
        Ok(prepared)
    }

    /// Best-effort removal of the objects uploaded for `prepared`.
    pub async fn discard(&self, prepared: &PreparedAnswers) {
        for key in &prepared.uploaded {
            if let Err(error) = self.images.delete_image(key).await {
                tracing::warn!(key, %error, "failed to delete orphaned answer image");
            }
        }
    }
}

fn check_answer(
    question: &QuestionDetail,
    purpose: QuestionPurpose,
    input: &AnswerInput,
) -> Result<Checked, ApiError> {
    let id = question.question.id;
    if question.question.purpose != purpose {
        return Err(ApiError::Validation(format!(
            "Question {id} does not belong to the {purpose} questionnaire"
        )));
    }

    if question.has_options() {
        let chosen = input.option_ids();
        if chosen.is_empty() {
            return Err(ApiError::Validation(format!(
                "Question {id} requires at least one option"
            )));
        }
        if input.text().is_some() {
            return Err(ApiError::Validation(format!(
                "Question {id} takes options, not a custom value"
            )));
        }
        if let Some(bad) = chosen
            .iter()
            .find(|option| !question.options.iter().any(|o| o.id == **option))
        {
            return Err(ApiError::Validation(format!(
                "Option {bad} does not belong to question {id}"
            )));
        }
        let mut ids = chosen.to_vec();
        ids.sort_unstable();
        ids.dedup();
        return Ok(Checked::Options(ids));
    }

    if !input.option_ids().is_empty() {
        return Err(ApiError::Validation(format!(
            "Question {id} has no options to choose from"
        )));
    }
    let Some(text) = input.text() else {
        return Err(ApiError::Validation(format!(
            "Question {id} requires a custom value"
        )));
    };

    let image = decode_image(text);
    if let Some(rule) = question.rule(ValidationType::FileFormat) {
        let Some(image) = &image else {
            return Err(ApiError::Validation(format!(
                "Answer to question {id} must be a base64 encoded image"
            )));
        };
        let allowed = allowed_formats(rule.value.as_deref());
        if !allowed.is_empty() && !allowed.contains(&image.format) {
            let names: Vec<&str> = allowed.iter().map(|f| f.as_str()).collect();
            return Err(ApiError::Validation(format!(
                "Answer to question {id} must be one of: {}",
                names.join(", ")
            )));
        }
    }

    match image {
        Some(image) => {
            if let Some(max_mb) = rule_number(question, ValidationType::FileSize) {
                #[allow(clippy::cast_precision_loss)]
                let size_mb = image.len() as f64 / BYTES_PER_MB;
                if size_mb > max_mb {
                    return Err(ApiError::Validation(format!(
                        "Answer to question {id} exceeds the maximum file size of {max_mb} MB"
                    )));
                }
            }
            Ok(Checked::Image(image))
        }
        None => {
            if let Some(max) = rule_number(question, ValidationType::MaxLength) {
                #[allow(clippy::cast_precision_loss)]
                let length = text.chars().count() as f64;
                if length > max {
                    return Err(ApiError::Validation(format!(
                        "Answer to question {id} must be at most {max} characters"
                    )));
                }
            }
            Ok(Checked::Text(text.to_string()))
        }
    }
}

/// Numeric value of a rule. A rule whose value does not parse is skipped.
fn rule_number(question: &QuestionDetail, validation_type: ValidationType) -> Option<f64> {
    let rule = question.rule(validation_type)?;
    let value = rule.value.as_deref()?.trim();
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() && number >= 0.0 => Some(number),
        _ => {
            tracing::warn!(
                question_id = question.question.id,
                rule = %validation_type,
                value,
                "ignoring unparsable validation rule"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vh_core::entities::{Question, QuestionOption, QuestionValidation};

    fn question(options: &[i64], rules: &[(ValidationType, &str)]) -> QuestionDetail {
        QuestionDetail {
            question: Question {
                id: 7,
                purpose: QuestionPurpose::VendorRoom,
                question_text: "Room photo".into(),
                sort_order: 0,
            },
            options: options
                .iter()
                .map(|id| QuestionOption {
                    id: *id,
                    question_id: 7,
                    option_text: format!("Option {id}"),
                })
                .collect(),
            validations: rules
                .iter()
                .enumerate()
                .map(|(i, (validation_type, value))| QuestionValidation {
                    id: i64::try_from(i).unwrap() + 1,
                    question_id: 7,
                    validation_type: *validation_type,
                    value: Some((*value).to_string()),
                })
                .collect(),
        }
    }

    fn text(value: &str) -> AnswerInput {
        AnswerInput {
            question_id: 7,
            question_option_id: None,
            custom_value: Some(value.into()),
        }
    }

    fn png_base64(extra: usize) -> String {
        use base64::Engine as _;
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.resize(8 + extra, 0);
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn wrong_purpose_rejected() {
        let q = question(&[], &[]);
        let err = check_answer(&q, QuestionPurpose::VenueChecklist, &text("hi")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn option_question_needs_own_options() {
        let q = question(&[3, 4], &[]);
        let mut input = AnswerInput {
            question_id: 7,
            question_option_id: Some(vec![4, 3, 4]),
            custom_value: None,
        };
        assert_eq!(
            check_answer(&q, QuestionPurpose::VendorRoom, &input).unwrap(),
            Checked::Options(vec![3, 4])
        );
        input.question_option_id = Some(vec![9]);
        let err = check_answer(&q, QuestionPurpose::VendorRoom, &input).unwrap_err();
        assert_eq!(err.to_string(), "Option 9 does not belong to question 7");
        input.question_option_id = Some(vec![]);
        assert!(check_answer(&q, QuestionPurpose::VendorRoom, &input).is_err());
    }

    #[test]
    fn option_question_rejects_custom_value() {
        let q = question(&[3], &[]);
        let input = AnswerInput {
            question_id: 7,
            question_option_id: Some(vec![3]),
            custom_value: Some("also this".into()),
        };
        assert!(check_answer(&q, QuestionPurpose::VendorRoom, &input).is_err());
    }

    #[test]
    fn free_text_question_needs_value() {
        let q = question(&[], &[]);
        assert!(check_answer(&q, QuestionPurpose::VendorRoom, &text("")).is_err());
        let with_options = AnswerInput {
            question_id: 7,
            question_option_id: Some(vec![1]),
            custom_value: Some("x".into()),
        };
        assert!(check_answer(&q, QuestionPurpose::VendorRoom, &with_options).is_err());
    }

    #[test]
    fn max_length_counts_characters() {
        let q = question(&[], &[(ValidationType::MaxLength, "5")]);
        assert_eq!(
            check_answer(&q, QuestionPurpose::VendorRoom, &text("héllo")).unwrap(),
            Checked::Text("héllo".into())
        );
        let err = check_answer(&q, QuestionPurpose::VendorRoom, &text("héllo!")).unwrap_err();
        assert_eq!(err.to_string(), "Answer to question 7 must be at most 5 characters");
    }

    #[test]
    fn file_format_requires_image() {
        let q = question(&[], &[(ValidationType::FileFormat, "png")]);
        let err = check_answer(&q, QuestionPurpose::VendorRoom, &text("not an image")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(matches!(
            check_answer(&q, QuestionPurpose::VendorRoom, &text(&png_base64(4))).unwrap(),
            Checked::Image(_)
        ));
    }

    #[test]
    fn file_format_allow_list_enforced() {
        let q = question(&[], &[(ValidationType::FileFormat, "jpeg,gif")]);
        let err = check_answer(&q, QuestionPurpose::VendorRoom, &text(&png_base64(4))).unwrap_err();
        assert_eq!(err.to_string(), "Answer to question 7 must be one of: jpeg, gif");
    }

    #[test]
    fn file_size_limit_in_megabytes() {
        let q = question(&[], &[(ValidationType::FileSize, "0.001")]);
        assert!(check_answer(&q, QuestionPurpose::VendorRoom, &text(&png_base64(100))).is_ok());
        let err = check_answer(&q, QuestionPurpose::VendorRoom, &text(&png_base64(2000))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Answer to question 7 exceeds the maximum file size of 0.001 MB"
        );
    }

    #[test]
    fn max_length_ignores_images() {
        let q = question(&[], &[(ValidationType::MaxLength, "3")]);
        assert!(matches!(
            check_answer(&q, QuestionPurpose::VendorRoom, &text(&png_base64(64))).unwrap(),
            Checked::Image(_)
        ));
    }

    #[test]
    fn unparsable_rule_is_skipped() {
        let q = question(&[], &[(ValidationType::MaxLength, "lots")]);
        assert!(check_answer(&q, QuestionPurpose::VendorRoom, &text("any length")).is_ok());
    }
}
