//! Unified error type for the service layer.
//!
//! Every crate error converges here. Controllers are the only place an
//! `ApiError` is turned into a status code.

use thiserror::Error;
use vh_core::errors::CoreError;
use vh_db::error::DatabaseError;
use vh_storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, failed shape validation, or an invalid clone source.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed entity or a referenced id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request is well-formed but breaks a business rule.
    #[error("{0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(#[from] DatabaseError),

    /// Object storage failed while handling an uploaded image.
    #[error("Content loading error: {0}")]
    ContentLoading(#[from] StorageError),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 422,
            Self::Repository(_) => 500,
            Self::ContentLoading(_) => 502,
        }
    }

    /// Whether the failure lies with the server rather than the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::ContentLoading(_))
    }

    pub(crate) fn not_found(label: &str, id: i64) -> Self {
        Self::NotFound(format!("{label} {id} not found"))
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type} {id} not found"))
            }
            CoreError::InvalidTransition { .. } => Self::Validation(error.to_string()),
            CoreError::Validation(message) => Self::BadRequest(message),
            CoreError::Other(error) => Self::BadRequest(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::BadRequest("x".into()), 400)]
    #[case(ApiError::NotFound("x".into()), 404)]
    #[case(ApiError::Validation("x".into()), 422)]
    #[case(ApiError::Repository(DatabaseError::NoResult), 500)]
    #[case(ApiError::ContentLoading(StorageError::NotConfigured("x".into())), 502)]
    fn status_per_variant(#[case] error: ApiError, #[case] status: u16) {
        assert_eq!(error.status(), status);
        assert_eq!(error.is_server_error(), status >= 500);
    }

    #[test]
    fn invalid_transition_is_unprocessable() {
        let error: ApiError = vh_core::enums::AnswerStatus::Rejected
            .transition(vh_core::enums::AnswerStatus::Validated)
            .unwrap_err()
            .into();
        assert_eq!(error.status(), 422);
    }

    #[test]
    fn core_validation_is_bad_request() {
        let error: ApiError = CoreError::Validation("name is required".into()).into();
        assert!(matches!(error, ApiError::BadRequest(ref m) if m == "name is required"));
    }

    #[test]
    fn core_not_found_keeps_entity_and_id() {
        let error: ApiError = CoreError::NotFound {
            entity_type: "Vendor".into(),
            id: "9".into(),
        }
        .into();
        assert_eq!(error.to_string(), "Vendor 9 not found");
    }
}
