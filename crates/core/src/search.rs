//! Lesson search matching and pagination helpers.
//!
//! The syllabus is small (a few dozen lessons), so text search runs in memory
//! over rows already filtered by role and part in SQL.

/// Default number of rows per page for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Maximum number of rows per page for list endpoints.
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Split a user query into lower-cased search terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// Whether every term of `query` appears in at least one of `fields`.
///
/// Matching is case-insensitive substring matching. A blank query matches
/// everything; `None` fields are ignored.
pub fn matches_query(fields: &[Option<&str>], query: &str) -> bool {
    let terms = query_terms(query);
    if terms.is_empty() {
        return true;
    }
    let haystacks: Vec<String> = fields.iter().flatten().map(|f| f.to_lowercase()).collect();
    terms
        .iter()
        .all(|term| haystacks.iter().any(|h| h.contains(term.as_str())))
}

/// Clamp a user-provided limit into `1..=max`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
