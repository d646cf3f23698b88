//! Email ban list model.

use qt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `banned_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BannedUser {
    pub id: DbId,
    pub email: String,
    pub reason: Option<String>,
    pub banned_by: Option<DbId>,
    pub created_at: Timestamp,
}
