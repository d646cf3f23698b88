//! Handlers for browsing lessons.

use axum::extract::State;
use qt_core::error::CoreError;
use qt_core::search::matches_query;
use qt_core::types::DbId;
use qt_db::models::lesson::{Lesson, LessonWithStatus, PartSummary};
use qt_db::repositories::LessonRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::middleware::auth::AuthUser;
use crate::query::LessonFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn ensure_visible(lesson: &Lesson, user: &AuthUser) -> AppResult<()> {
    if !user.role.satisfies(lesson.min_role()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this lesson".into(),
        )));
    }
    Ok(())
}

/// Load a lesson the caller may see: 404 if missing, 403 if above their role.
pub async fn visible_lesson(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Lesson> {
    let lesson = LessonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Lesson",
            id,
        })?;
    ensure_visible(&lesson, user)?;
    Ok(lesson)
}

/// GET /api/v1/lessons?part=&q=
///
/// Lessons visible to the caller's role in syllabus order, with the caller's
/// bookmark, reflection and completion flags.
pub async fn list_lessons(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<LessonFilterParams>,
) -> AppResult<Json<DataResponse<Vec<LessonWithStatus>>>> {
    let part = params.part.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let lessons = LessonRepo::list_with_status(
        &state.pool,
        user.user_id,
        &user.role.satisfied_names(),
        part,
    )
    .await?;

    let query = params.q.unwrap_or_default();
    let lessons: Vec<_> = lessons
        .into_iter()
        .filter(|l| matches_query(&l.lesson.search_fields(), &query))
        .collect();
    Ok(Json(DataResponse { data: lessons }))
}

/// GET /api/v1/lessons/parts
pub async fn list_parts(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PartSummary>>>> {
    let parts = LessonRepo::list_parts(&state.pool, &user.role.satisfied_names()).await?;
    Ok(Json(DataResponse { data: parts }))
}

/// GET /api/v1/lessons/{id}
pub async fn get_lesson(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LessonWithStatus>>> {
    let lesson = LessonRepo::find_with_status(&state.pool, id, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Lesson",
            id,
        })?;
    ensure_visible(&lesson.lesson, &user)?;
    Ok(Json(DataResponse { data: lesson }))
}
