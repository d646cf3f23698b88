//! Single-use email tokens (verification and password reset).

use qt_core::types::{DbId, Timestamp};
use sqlx::FromRow;

pub const PURPOSE_VERIFY_EMAIL: &str = "verify_email";
pub const PURPOSE_RESET_PASSWORD: &str = "reset_password";

/// A row from the `auth_tokens` table. Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub id: DbId,
    pub user_id: DbId,
    pub purpose: String,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
