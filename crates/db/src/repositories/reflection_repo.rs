//! Repository for the `reflections` table.

use qt_core::types::DbId;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::models::reflection::{
    PublicReflection, Reflection, ReflectionWithLesson, UpsertReflection,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, lesson_id, content, direction, is_public, created_at, updated_at";

const R_COLUMNS: &str = "r.id, r.user_id, r.lesson_id, r.content, r.direction, r.is_public, \
                         r.created_at, r.updated_at";

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    reflection: Reflection,
    inserted: bool,
}

/// Provides CRUD operations for reflections.
pub struct ReflectionRepo;

impl ReflectionRepo {
    /// Create or replace the user's reflection on a lesson.
    ///
    /// Returns the row and whether it was newly inserted. The unique
    /// `(user_id, lesson_id)` constraint guarantees one reflection per lesson.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: DbId,
        lesson_id: DbId,
        input: &UpsertReflection,
    ) -> Result<(Reflection, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO reflections (user_id, lesson_id, content, direction, is_public)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_reflections_user_lesson DO UPDATE SET
                content = EXCLUDED.content,
                direction = EXCLUDED.direction,
                is_public = EXCLUDED.is_public
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        let row = sqlx::query_as::<_, UpsertRow>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .bind(&input.content)
            .bind(&input.direction)
            .bind(input.is_public)
            .fetch_one(&mut *conn)
            .await?;
        Ok((row.reflection, row.inserted))
    }

    /// Record that the user earned points for reflecting on a lesson.
    ///
    /// Returns `true` only the first time for a given `(user_id, lesson_id)`,
    /// even if the reflection was deleted and written again since.
    pub async fn record_award(
        conn: &mut PgConnection,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO reflection_awards (user_id, lesson_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT pk_reflection_awards DO NOTHING",
        )
        .bind(user_id)
        .bind(lesson_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the user's reflection on a lesson.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<Option<Reflection>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM reflections WHERE user_id = $1 AND lesson_id = $2");
        sqlx::query_as::<_, Reflection>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's reflections on lessons whose `min_role` is one of
    /// `visible_roles`, most recently edited first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        visible_roles: &[&str],
    ) -> Result<Vec<ReflectionWithLesson>, sqlx::Error> {
        Self::list_joined(pool, user_id, visible_roles, "r.updated_at DESC, r.id DESC").await
    }

    /// The user's visible reflections in syllabus order, for export.
    pub async fn list_for_export(
        pool: &PgPool,
        user_id: DbId,
        visible_roles: &[&str],
    ) -> Result<Vec<ReflectionWithLesson>, sqlx::Error> {
        Self::list_joined(pool, user_id, visible_roles, "l.sort_order, l.id").await
    }

    async fn list_joined(
        pool: &PgPool,
        user_id: DbId,
        visible_roles: &[&str],
        order_by: &'static str,
    ) -> Result<Vec<ReflectionWithLesson>, sqlx::Error> {
        let query = format!(
            "SELECT {R_COLUMNS},
                    l.title AS lesson_title,
                    l.part AS lesson_part,
                    l.urdu_title AS lesson_urdu_title
             FROM reflections r
             JOIN lessons l ON l.id = r.lesson_id
             WHERE r.user_id = $1
               AND l.min_role = ANY($2)
             ORDER BY {order_by}"
        );
        sqlx::query_as::<_, ReflectionWithLesson>(&query)
            .bind(user_id)
            .bind(visible_roles)
            .fetch_all(pool)
            .await
    }

    /// Public reflections on a lesson by other, non-banned users.
    pub async fn list_public_for_lesson(
        pool: &PgPool,
        lesson_id: DbId,
        exclude_user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PublicReflection>, sqlx::Error> {
        sqlx::query_as::<_, PublicReflection>(
            "SELECT r.id, u.name AS author_name, r.content, r.direction, r.updated_at
             FROM reflections r
             JOIN users u ON u.id = r.user_id
             WHERE r.lesson_id = $1
               AND r.is_public
               AND r.user_id <> $2
               AND NOT u.is_banned
             ORDER BY r.updated_at DESC, r.id DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(lesson_id)
        .bind(exclude_user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Delete the user's reflection on a lesson. Returns `true` if a row was deleted.
    pub async fn delete(
        conn: &mut PgConnection,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reflections WHERE user_id = $1 AND lesson_id = $2")
            .bind(user_id)
            .bind(lesson_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
