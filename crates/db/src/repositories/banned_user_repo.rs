//! Repository for the `banned_users` table (email-keyed block list).

use qt_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::banned_user::BannedUser;

const COLUMNS: &str = "id, email, reason, banned_by, created_at";

/// Provides operations on the email ban list.
pub struct BannedUserRepo;

impl BannedUserRepo {
    /// Whether a normalized email is on the ban list.
    pub async fn is_banned(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (banned,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM banned_users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;
        Ok(banned)
    }

    /// Add an email to the ban list. Re-banning updates the reason.
    pub async fn ban(
        conn: &mut PgConnection,
        email: &str,
        reason: Option<&str>,
        banned_by: DbId,
    ) -> Result<BannedUser, sqlx::Error> {
        let query = format!(
            "INSERT INTO banned_users (email, reason, banned_by)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_banned_users_email DO UPDATE SET
                reason = EXCLUDED.reason,
                banned_by = EXCLUDED.banned_by
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BannedUser>(&query)
            .bind(email)
            .bind(reason)
            .bind(banned_by)
            .fetch_one(&mut *conn)
            .await
    }

    /// Remove an email from the ban list. Returns `true` if it was listed.
    pub async fn unban(conn: &mut PgConnection, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM banned_users WHERE email = $1")
            .bind(email)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The full ban list, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<BannedUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM banned_users ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, BannedUser>(&query).fetch_all(pool).await
    }
}
