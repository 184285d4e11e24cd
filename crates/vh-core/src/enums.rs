//! Sorting, archive filtering, cloning and questionnaire enums for VenueHub.
//!
//! Enums stored in SQL use `snake_case` serialization and expose `as_str()`
//! for the stored representation. `AnswerStatus` carries its own state
//! machine through `allowed_next_states()`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

/// Direction of an ORDER BY term.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ---------------------------------------------------------------------------
// ArchivedFilter
// ---------------------------------------------------------------------------

/// Soft-delete filter derived from the numeric `archived` request flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArchivedFilter {
    /// `archived_at IS NOT NULL`
    Archived,
    /// `archived_at IS NULL`
    Active,
}

impl ArchivedFilter {
    /// Interpret the request flag: `1` selects archived rows, any other
    /// non-zero value selects live rows, `0` or absent applies no filter.
    #[must_use]
    pub const fn from_flag(flag: Option<i64>) -> Option<Self> {
        match flag {
            Some(1) => Some(Self::Archived),
            Some(0) | None => None,
            Some(_) => Some(Self::Active),
        }
    }

    /// The request flag that selects this filter.
    #[must_use]
    pub const fn flag(self) -> i64 {
        match self {
            Self::Archived => 1,
            Self::Active => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// CreateType
// ---------------------------------------------------------------------------

/// Whether a create request starts fresh or is seeded from an existing row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CreateType {
    #[default]
    New,
    Clone,
}

// ---------------------------------------------------------------------------
// QuestionPurpose
// ---------------------------------------------------------------------------

/// Which questionnaire a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPurpose {
    VendorRoom,
    VenueChecklist,
}

impl QuestionPurpose {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VendorRoom => "vendor_room",
            Self::VenueChecklist => "venue_checklist",
        }
    }

    /// Prefix used when naming uploaded answer images.
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::VendorRoom => "vendor-room",
            Self::VenueChecklist => "venue-checklist",
        }
    }
}

impl fmt::Display for QuestionPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidationType
// ---------------------------------------------------------------------------

/// Per-question answer rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    /// Decoded image payload must not exceed the value, in megabytes.
    FileSize,
    /// Answer must decode as a base64 image; value optionally lists formats.
    FileFormat,
    /// Text answer must not exceed the value, in characters.
    MaxLength,
}

impl ValidationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileSize => "file_size",
            Self::FileFormat => "file_format",
            Self::MaxLength => "max_length",
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AnswerStatus
// ---------------------------------------------------------------------------

/// Status of a submitted questionnaire answer while it is being checked.
///
/// ```text
/// pending → validated
///         → rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Pending,
    Validated,
    Rejected,
}

impl AnswerStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Validated, Self::Rejected],
            Self::Validated | Self::Rejected => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Move to `next`, or fail with `InvalidTransition`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` when `next` is not reachable.
    pub fn transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                entity_type: "answer".into(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
