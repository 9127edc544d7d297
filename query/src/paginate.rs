//! Windowing over filtered, ordered records.
//!
//! Two styles are supported:
//! - numbered pages: `page` (from 1) and `per_page`
//! - cursors: `before`/`after` record ids, then `skip`, `first` and `last`
//!
//! `total` and the page flags always describe the filtered sequence.

use serde::{Deserialize, Serialize};
use stitch_core::{Document, DocumentExt, RecordId};

use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub skip: Option<usize>,
    pub first: Option<usize>,
    pub last: Option<usize>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbered page, counting from 1.
    pub fn page(page: usize, per_page: usize) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_first(mut self, first: usize) -> Self {
        self.first = Some(first);
        self
    }

    pub fn with_last(mut self, last: usize) -> Self {
        self.last = Some(last);
        self
    }

    pub fn with_before(mut self, id: impl Into<String>) -> Self {
        self.before = Some(id.into());
        self
    }

    pub fn with_after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A window of records plus paging metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginatedResult {
    pub data: Vec<Document>,
    /// Number of records that passed filtering.
    pub total: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginatedResult {
    pub fn ids(&self) -> Vec<RecordId> {
        self.data.iter().filter_map(|d| d.record_id()).collect()
    }
}

/// Cut `rows` down to the requested window.
pub fn paginate(mut rows: Vec<Document>, pagination: &Pagination) -> QueryResult<PaginatedResult> {
    let total = rows.len();
    if pagination.is_empty() || rows.is_empty() {
        return Ok(PaginatedResult {
            data: rows,
            total,
            ..PaginatedResult::default()
        });
    }

    if let (Some(page), Some(per_page)) = (pagination.page, pagination.per_page) {
        if page == 0 || per_page == 0 {
            return Err(QueryError::invalid_pagination(
                "page and perPage start at 1",
            ));
        }
        let start = per_page.saturating_mul(page - 1).min(total);
        let end = start.saturating_add(per_page).min(total);
        return Ok(PaginatedResult {
            data: rows.drain(start..end).collect(),
            total,
            has_next_page: total.div_ceil(per_page) > page,
            has_previous_page: page > 1,
        });
    }

    let position = |id: &str| rows.iter().position(|r| r.field("id").as_str() == Some(id));
    let mut start = 0;
    let mut end = total;
    if let Some(before) = &pagination.before {
        end = position(before).unwrap_or(total);
    }
    if let Some(after) = &pagination.after {
        if let Some(found) = rows
            .iter()
            .rposition(|r| r.field("id").as_str() == Some(after.as_str()))
        {
            start = found + 1;
        }
    }
    start = start.saturating_add(pagination.skip.unwrap_or(0)).min(end.max(start));
    if let Some(first) = pagination.first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = pagination.last {
        start = start.max(end.saturating_sub(last));
    }

    let (start, end) = (start.min(total), end.min(total));
    if start >= end {
        return Ok(PaginatedResult {
            total,
            ..PaginatedResult::default()
        });
    }
    Ok(PaginatedResult {
        has_next_page: end < total,
        has_previous_page: start > 0,
        data: rows.drain(start..end).collect(),
        total,
    })
}
