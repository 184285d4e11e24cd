//! Lookup tables and questionnaire questions.

use serde::Deserialize;
use serde_json::Value;
use vh_core::errors::CoreError;
use vh_core::requests::{QuestionPayload, QuestionQuery, Validate};

use super::{created, parse_body, respond};
use crate::response::ApiResponse;
use crate::services::lookup::{LookupKind, LookupService};
use crate::services::questionnaire::QuestionnaireService;

#[derive(Debug, Deserialize)]
struct NameBody {
    name: String,
}

impl Validate for NameBody {
    fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileBody {
    first_name: String,
    last_name: String,
    email: Option<String>,
}

impl Validate for ProfileBody {
    fn validate(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct LookupController {
    lookups: LookupService,
    questions: QuestionnaireService,
}

impl LookupController {
    #[must_use]
    pub const fn new(lookups: LookupService, questions: QuestionnaireService) -> Self {
        Self { lookups, questions }
    }

    pub async fn list(&self, kind: LookupKind) -> ApiResponse {
        respond(self.lookups.list(kind).await, |rows| {
            ApiResponse::ok(&format!("{} list fetched successfully", kind.label()), &rows)
        })
    }

    pub async fn add(&self, kind: LookupKind, body: Value) -> ApiResponse {
        let result = async {
            let body: NameBody = parse_body(body)?;
            self.lookups.add(kind, body.name.trim()).await
        }
        .await;
        created(kind.label(), result)
    }

    pub async fn add_profile(&self, body: Value) -> ApiResponse {
        let result = async {
            let body: ProfileBody = parse_body(body)?;
            self.lookups
                .add_profile(&body.first_name, &body.last_name, body.email.as_deref())
                .await
        }
        .await;
        created(LookupKind::Profiles.label(), result)
    }

    /// Questions for one purpose, each with its options and rules.
    pub async fn questions(&self, body: Value) -> ApiResponse {
        let result = async {
            let query: QuestionQuery = parse_body(body)?;
            self.questions.questions(query.purpose).await
        }
        .await;
        respond(result, |questions| {
            ApiResponse::ok("Question list fetched successfully", &questions)
        })
    }

    pub async fn create_question(&self, body: Value) -> ApiResponse {
        let result = async {
            let payload: QuestionPayload = parse_body(body)?;
            self.questions.create_question(&payload).await
        }
        .await;
        created("Question", result)
    }
}
