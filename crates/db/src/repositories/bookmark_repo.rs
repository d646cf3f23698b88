//! Repository for the `bookmarks` table.

use qt_core::types::DbId;
use sqlx::PgPool;

use crate::models::bookmark::BookmarkedLesson;

/// Provides toggle and list operations for bookmarks.
pub struct BookmarkRepo;

impl BookmarkRepo {
    /// Flip the bookmark for `(user_id, lesson_id)`.
    ///
    /// Runs as a single statement: an existing bookmark is deleted, otherwise
    /// one is inserted. Returns `true` if the lesson is bookmarked afterwards.
    pub async fn toggle(pool: &PgPool, user_id: DbId, lesson_id: DbId) -> Result<bool, sqlx::Error> {
        let (bookmarked,): (bool,) = sqlx::query_as(
            "WITH deleted AS (
                DELETE FROM bookmarks WHERE user_id = $1 AND lesson_id = $2 RETURNING id
             ),
             inserted AS (
                INSERT INTO bookmarks (user_id, lesson_id)
                SELECT $1, $2 WHERE NOT EXISTS (SELECT 1 FROM deleted)
                ON CONFLICT ON CONSTRAINT uq_bookmarks_user_lesson DO NOTHING
                RETURNING id
             )
             SELECT EXISTS (SELECT 1 FROM inserted)",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(pool)
        .await?;
        Ok(bookmarked)
    }

    /// Whether the user has bookmarked the lesson.
    pub async fn exists(pool: &PgPool, user_id: DbId, lesson_id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM bookmarks WHERE user_id = $1 AND lesson_id = $2)",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// The user's bookmarked lessons whose `min_role` is one of
    /// `visible_roles`, most recently saved first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        visible_roles: &[&str],
    ) -> Result<Vec<BookmarkedLesson>, sqlx::Error> {
        sqlx::query_as::<_, BookmarkedLesson>(
            "SELECT l.id, l.title, l.part, l.urdu_title, l.description, l.reference,
                    l.presentation_url, l.min_role, l.sort_order, l.created_at, l.updated_at,
                    b.created_at AS bookmarked_at
             FROM bookmarks b
             JOIN lessons l ON l.id = b.lesson_id
             WHERE b.user_id = $1
               AND l.min_role = ANY($2)
             ORDER BY b.created_at DESC, b.id DESC",
        )
        .bind(user_id)
        .bind(visible_roles)
        .fetch_all(pool)
        .await
    }
}
