//! Repository for the `user_progress` table.

use qt_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::progress::{ProgressWithLesson, UpsertProgress, UserProgress};

const COLUMNS: &str = "id, user_id, lesson_id, position_secs, completed, last_accessed_at";

const JOINED_SELECT: &str = "SELECT p.id, p.user_id, p.lesson_id, p.position_secs, p.completed,
                                    p.last_accessed_at,
                                    l.title AS lesson_title, l.part AS lesson_part
                             FROM user_progress p
                             JOIN lessons l ON l.id = p.lesson_id
                             WHERE p.user_id = $1
                               AND l.min_role = ANY($2)
                             ORDER BY p.last_accessed_at DESC, p.id DESC";

/// Tracks last access, playback position and completion per user/lesson.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Record progress on a lesson and bump `last_accessed_at`.
    ///
    /// Completion is sticky: once completed, a lesson stays completed.
    /// Returns the row and whether this call completed the lesson for the
    /// first time. The row is created if missing and then locked, so of two
    /// concurrent first completions only one reports `true`.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: DbId,
        lesson_id: DbId,
        input: &UpsertProgress,
    ) -> Result<(UserProgress, bool), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_progress (user_id, lesson_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_user_progress_user_lesson DO NOTHING",
        )
        .bind(user_id)
        .bind(lesson_id)
        .execute(&mut *conn)
        .await?;

        let (was_completed,): (bool,) = sqlx::query_as(
            "SELECT completed FROM user_progress
             WHERE user_id = $1 AND lesson_id = $2
             FOR UPDATE",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(&mut *conn)
        .await?;

        let query = format!(
            "UPDATE user_progress SET
                position_secs = $3,
                completed = completed OR $4,
                last_accessed_at = NOW()
             WHERE user_id = $1 AND lesson_id = $2
             RETURNING {COLUMNS}"
        );
        let progress = sqlx::query_as::<_, UserProgress>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .bind(input.position_secs)
            .bind(input.completed)
            .fetch_one(&mut *conn)
            .await?;

        let newly_completed = progress.completed && !was_completed;
        Ok((progress, newly_completed))
    }

    /// Progress rows for a user on lessons whose `min_role` is one of
    /// `visible_roles`, most recently accessed first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        visible_roles: &[&str],
    ) -> Result<Vec<ProgressWithLesson>, sqlx::Error> {
        sqlx::query_as::<_, ProgressWithLesson>(JOINED_SELECT)
            .bind(user_id)
            .bind(visible_roles)
            .fetch_all(pool)
            .await
    }

    /// The most recently accessed lesson ("continue where you left off").
    pub async fn most_recent(
        pool: &PgPool,
        user_id: DbId,
        visible_roles: &[&str],
    ) -> Result<Option<ProgressWithLesson>, sqlx::Error> {
        let query = format!("{JOINED_SELECT} LIMIT 1");
        sqlx::query_as::<_, ProgressWithLesson>(&query)
            .bind(user_id)
            .bind(visible_roles)
            .fetch_optional(pool)
            .await
    }
}
