//! Handlers for `/admin/lessons` (syllabus management).
//!
//! All handlers require the `ADMIN` role via [`RequireAdmin`].

use axum::extract::State;
use axum::http::StatusCode;
use qt_core::error::CoreError;
use qt_core::lesson::{
    validate_description, validate_part, validate_presentation_url, validate_reference,
    validate_title,
};
use qt_core::types::DbId;
use qt_db::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use qt_db::repositories::LessonRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Validate optional text where `""` means "clear".
fn validate_optional(
    value: Option<&str>,
    check: fn(&str) -> Result<(), CoreError>,
) -> Result<(), CoreError> {
    match value {
        Some(v) if !v.is_empty() => check(v),
        _ => Ok(()),
    }
}

fn validate_sort_order(sort_order: Option<i32>) -> Result<(), CoreError> {
    match sort_order {
        Some(n) if n < 0 => Err(CoreError::Validation(
            "sort_order must not be negative".into(),
        )),
        _ => Ok(()),
    }
}

/// GET /api/v1/admin/lessons
///
/// Every lesson regardless of `min_role`, in syllabus order.
pub async fn list_lessons(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Lesson>>>> {
    let lessons = LessonRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: lessons }))
}

/// POST /api/v1/admin/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateLesson>,
) -> AppResult<(StatusCode, Json<DataResponse<Lesson>>)> {
    let input = CreateLesson {
        title: input.title.trim().to_string(),
        part: input.part.trim().to_string(),
        urdu_title: trimmed(input.urdu_title).filter(|v| !v.is_empty()),
        reference: trimmed(input.reference).filter(|v| !v.is_empty()),
        presentation_url: trimmed(input.presentation_url).filter(|v| !v.is_empty()),
        ..input
    };
    validate_title(&input.title)?;
    validate_part(&input.part)?;
    validate_optional(input.urdu_title.as_deref(), validate_title)?;
    validate_description(&input.description)?;
    validate_optional(input.reference.as_deref(), validate_reference)?;
    validate_optional(input.presentation_url.as_deref(), validate_presentation_url)?;
    validate_sort_order(input.sort_order)?;

    let lesson = LessonRepo::create(&state.pool, &input).await?;
    tracing::info!(lesson_id = lesson.id, admin_id = admin.user_id, "Lesson created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

/// PUT /api/v1/admin/lessons/{id}
///
/// Partial update; an empty string clears `urdu_title`, `reference` or
/// `presentation_url`.
pub async fn update_lesson(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLesson>,
) -> AppResult<Json<DataResponse<Lesson>>> {
    let input = UpdateLesson {
        title: trimmed(input.title),
        part: trimmed(input.part),
        urdu_title: trimmed(input.urdu_title),
        reference: trimmed(input.reference),
        presentation_url: trimmed(input.presentation_url),
        ..input
    };
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(part) = &input.part {
        validate_part(part)?;
    }
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    validate_optional(input.urdu_title.as_deref(), validate_title)?;
    validate_optional(input.reference.as_deref(), validate_reference)?;
    validate_optional(input.presentation_url.as_deref(), validate_presentation_url)?;
    validate_sort_order(input.sort_order)?;

    let lesson = LessonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Lesson",
            id,
        })?;
    tracing::info!(lesson_id = id, admin_id = admin.user_id, "Lesson updated");
    Ok(Json(DataResponse { data: lesson }))
}

/// DELETE /api/v1/admin/lessons/{id}
///
/// Deletes the lesson with its reflections, bookmarks and progress. Returns 204.
pub async fn delete_lesson(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !LessonRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }));
    }
    tracing::info!(lesson_id = id, admin_id = admin.user_id, "Lesson deleted");
    Ok(StatusCode::NO_CONTENT)
}
