use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Validate;
use crate::enums::SortOrder;
use crate::errors::CoreError;

const fn default_limit() -> u64 {
    10
}

/// Largest value SQLite accepts as an integer `LIMIT`/`OFFSET`.
const MAX_WINDOW: u64 = i64::MAX.unsigned_abs();

/// Requested ordering: a field name from the domain's allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// Body of every `POST /list` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", bound(deserialize = "F: Deserialize<'de>"))]
pub struct ListRequest<F> {
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub filter: Option<F>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl<F> Default for ListRequest<F> {
    fn default() -> Self {
        Self {
            search_text: None,
            filter: None,
            sort_by: None,
            offset: 0,
            limit: default_limit(),
        }
    }
}

impl<F> ListRequest<F> {
    /// Search text with surrounding whitespace removed; `None` when blank.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl<F> Validate for ListRequest<F> {
    fn validate(&self) -> Result<(), CoreError> {
        if self.limit == 0 {
            return Err(CoreError::Validation("limit must be a positive number".into()));
        }
        if self.limit > MAX_WINDOW {
            return Err(CoreError::Validation(format!("limit must not exceed {MAX_WINDOW}")));
        }
        if self.offset > MAX_WINDOW {
            return Err(CoreError::Validation(format!("offset must not exceed {MAX_WINDOW}")));
        }
        Ok(())
    }
}
