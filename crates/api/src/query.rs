//! Shared query parameter types for API handlers.

use qt_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` clamped to the allowed range.
    pub fn clamped(&self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            clamp_offset(self.offset),
        )
    }
}

/// Query parameters for `GET /lessons`.
#[derive(Debug, Default, Deserialize)]
pub struct LessonFilterParams {
    /// Restrict to one syllabus part.
    pub part: Option<String>,
    /// Free-text search over title, part, Urdu title, description and reference.
    pub q: Option<String>,
}
