//! Repository for the `oauth_accounts` table.

use qt_core::types::DbId;
use sqlx::PgPool;

use crate::models::oauth_account::OAuthAccount;

const COLUMNS: &str = "id, user_id, provider, provider_account_id, created_at";

/// Links between users and third-party identities.
pub struct OAuthAccountRepo;

impl OAuthAccountRepo {
    /// Find the link for a provider identity.
    pub async fn find(
        pool: &PgPool,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<OAuthAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM oauth_accounts
             WHERE provider = $1 AND provider_account_id = $2"
        );
        sqlx::query_as::<_, OAuthAccount>(&query)
            .bind(provider)
            .bind(provider_account_id)
            .fetch_optional(pool)
            .await
    }

    /// Link a provider identity to a user. Linking an existing identity is a no-op.
    pub async fn link(
        pool: &PgPool,
        user_id: DbId,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO oauth_accounts (user_id, provider, provider_account_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_oauth_accounts_provider_account DO NOTHING",
        )
        .bind(user_id)
        .bind(provider)
        .bind(provider_account_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All identities linked to a user.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<OAuthAccount>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM oauth_accounts WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, OAuthAccount>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
