//! Linked third-party identity model.

use qt_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `oauth_accounts` table linking a provider identity to a user.
#[derive(Debug, Clone, FromRow)]
pub struct OAuthAccount {
    pub id: DbId,
    pub user_id: DbId,
    pub provider: String,
    pub provider_account_id: String,
    pub created_at: Timestamp,
}
