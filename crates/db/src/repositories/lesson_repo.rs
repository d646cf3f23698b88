//! Repository for the `lessons` table.

use qt_core::roles::ROLE_USER;
use qt_core::types::DbId;
use sqlx::PgPool;

use crate::models::lesson::{CreateLesson, Lesson, LessonWithStatus, PartSummary, UpdateLesson};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, part, urdu_title, description, reference, presentation_url, \
                       min_role, sort_order, created_at, updated_at";

/// Same columns qualified with the `l` alias, for joins.
const L_COLUMNS: &str = "l.id, l.title, l.part, l.urdu_title, l.description, l.reference, \
                         l.presentation_url, l.min_role, l.sort_order, l.created_at, l.updated_at";

/// Per-user status columns; `$1` is the caller's user id.
const STATUS_COLUMNS: &str =
    "EXISTS (SELECT 1 FROM bookmarks b WHERE b.lesson_id = l.id AND b.user_id = $1) AS is_bookmarked,
     EXISTS (SELECT 1 FROM reflections r WHERE r.lesson_id = l.id AND r.user_id = $1) AS has_reflection,
     COALESCE((SELECT p.completed FROM user_progress p
               WHERE p.lesson_id = l.id AND p.user_id = $1), false) AS completed";

/// Provides CRUD operations for lessons.
pub struct LessonRepo;

impl LessonRepo {
    /// Insert a new lesson, returning the created row.
    ///
    /// A missing `sort_order` places the lesson after every existing one.
    pub async fn create(pool: &PgPool, input: &CreateLesson) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons
                (title, part, urdu_title, description, reference, presentation_url,
                 min_role, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     COALESCE($8, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM lessons)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(&input.title)
            .bind(&input.part)
            .bind(&input.urdu_title)
            .bind(&input.description)
            .bind(&input.reference)
            .bind(&input.presentation_url)
            .bind(input.min_role.map(|r| r.as_str()).unwrap_or(ROLE_USER))
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a lesson by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a lesson by ID together with `user_id`'s status flags.
    ///
    /// Does not apply role filtering; callers check `min_role` themselves so
    /// they can tell "forbidden" from "not found".
    pub async fn find_with_status(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<LessonWithStatus>, sqlx::Error> {
        let query = format!(
            "SELECT {L_COLUMNS}, {STATUS_COLUMNS}
             FROM lessons l
             WHERE l.id = $2"
        );
        sqlx::query_as::<_, LessonWithStatus>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every lesson in syllabus order (admin view).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons ORDER BY sort_order, id");
        sqlx::query_as::<_, Lesson>(&query).fetch_all(pool).await
    }

    /// List lessons whose `min_role` is one of `visible_roles`, with the
    /// caller's status flags, optionally restricted to one part.
    pub async fn list_with_status(
        pool: &PgPool,
        user_id: DbId,
        visible_roles: &[&str],
        part: Option<&str>,
    ) -> Result<Vec<LessonWithStatus>, sqlx::Error> {
        let query = format!(
            "SELECT {L_COLUMNS}, {STATUS_COLUMNS}
             FROM lessons l
             WHERE l.min_role = ANY($2)
               AND ($3::TEXT IS NULL OR l.part = $3)
             ORDER BY l.sort_order, l.id"
        );
        sqlx::query_as::<_, LessonWithStatus>(&query)
            .bind(user_id)
            .bind(visible_roles)
            .bind(part)
            .fetch_all(pool)
            .await
    }

    /// Distinct parts visible to `visible_roles`, in syllabus order.
    pub async fn list_parts(
        pool: &PgPool,
        visible_roles: &[&str],
    ) -> Result<Vec<PartSummary>, sqlx::Error> {
        sqlx::query_as::<_, PartSummary>(
            "SELECT part, COUNT(*) AS lesson_count
             FROM lessons
             WHERE min_role = ANY($1)
             GROUP BY part
             ORDER BY MIN(sort_order), part",
        )
        .bind(visible_roles)
        .fetch_all(pool)
        .await
    }

    /// Update a lesson. Only non-`None` fields in `input` are applied; an empty
    /// string clears `urdu_title`, `reference` or `presentation_url`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLesson,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!(
            "UPDATE lessons SET
                title = COALESCE($2, title),
                part = COALESCE($3, part),
                urdu_title = NULLIF(COALESCE($4, urdu_title), ''),
                description = COALESCE($5, description),
                reference = NULLIF(COALESCE($6, reference), ''),
                presentation_url = NULLIF(COALESCE($7, presentation_url), ''),
                min_role = COALESCE($8, min_role),
                sort_order = COALESCE($9, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.part)
            .bind(&input.urdu_title)
            .bind(&input.description)
            .bind(&input.reference)
            .bind(&input.presentation_url)
            .bind(input.min_role.map(|r| r.as_str()))
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a lesson (cascades to reflections, bookmarks and progress).
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
