//! Handlers for lesson progress (playback position and completion).

use axum::extract::State;
use chrono::Utc;
use qt_core::error::CoreError;
use qt_core::gamification::COMPLETION_POINTS;
use qt_core::types::DbId;
use qt_db::models::progress::{ProgressWithLesson, UpsertProgress, UserProgress};
use qt_db::repositories::{ProgressRepo, UserRepo};

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::handlers::lessons::visible_lesson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/progress
pub async fn list_progress(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ProgressWithLesson>>>> {
    let progress = ProgressRepo::list_for_user(&state.pool, user.user_id, &user.role.satisfied_names())
            .await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/progress/recent
///
/// The most recently accessed lesson, or `null`.
pub async fn recent(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Option<ProgressWithLesson>>>> {
    let progress = ProgressRepo::most_recent(&state.pool, user.user_id, &user.role.satisfied_names())
            .await?;
    Ok(Json(DataResponse { data: progress }))
}

/// PUT /api/v1/lessons/{id}/progress
///
/// Record the playback position. Completion is sticky; the first completion
/// awards points and advances the streak.
pub async fn save_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<UpsertProgress>,
) -> AppResult<Json<DataResponse<UserProgress>>> {
    if input.position_secs < 0 {
        return Err(CoreError::Validation("position_secs must not be negative".into()).into());
    }
    visible_lesson(&state, &user, lesson_id).await?;

    let mut tx = state.pool.begin().await?;
    let (progress, newly_completed) =
        ProgressRepo::upsert(&mut tx, user.user_id, lesson_id, &input).await?;
    if newly_completed {
        UserRepo::record_activity(
            &mut tx,
            user.user_id,
            Utc::now().date_naive(),
            COMPLETION_POINTS,
        )
        .await?;
        tracing::info!(user_id = user.user_id, lesson_id, "Lesson completed");
    }
    tx.commit().await?;

    Ok(Json(DataResponse { data: progress }))
}
