//! Aggregate counts for the admin dashboard.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminStats {
    pub user_count: i64,
    pub admin_count: i64,
    pub banned_count: i64,
    pub lesson_count: i64,
    pub reflection_count: i64,
    pub bookmark_count: i64,
}
