//! Offset/limit pagination shared by every list endpoint.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One page of list results plus the metadata the UI pages with.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total_amount: u64,
    pub next_page: bool,
    pub total_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    /// Build a page from the rows query and the count query.
    ///
    /// `limit` is validated as positive by the controllers; a zero limit
    /// yields zero pages rather than dividing by zero.
    #[must_use]
    pub fn new(rows: Vec<T>, total_amount: u64, offset: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_amount.div_ceil(limit)
        };
        Self {
            rows,
            total_amount,
            next_page: offset.saturating_add(limit) < total_amount,
            total_pages,
            offset,
            limit,
        }
    }

    /// Convert the row type while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total_amount: self.total_amount,
            next_page: self.next_page,
            total_pages: self.total_pages,
            offset: self.offset,
            limit: self.limit,
        }
    }
}
