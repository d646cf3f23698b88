//! Handlers for bookmarks (lessons saved for later / offline use).

use axum::extract::State;
use qt_core::types::DbId;
use qt_db::models::bookmark::BookmarkedLesson;
use qt_db::repositories::BookmarkRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::handlers::lessons::visible_lesson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookmarkState {
    pub lesson_id: DbId,
    pub bookmarked: bool,
}

/// GET /api/v1/bookmarks
///
/// Bookmarked lessons the caller may still see, most recently saved first.
pub async fn list_bookmarks(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<BookmarkedLesson>>>> {
    let bookmarks = BookmarkRepo::list_for_user(&state.pool, user.user_id, &user.role.satisfied_names())
            .await?;
    Ok(Json(DataResponse { data: bookmarks }))
}

/// POST /api/v1/lessons/{id}/bookmark
///
/// Toggle the bookmark and return the new state.
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<DataResponse<BookmarkState>>> {
    visible_lesson(&state, &user, lesson_id).await?;
    let bookmarked = BookmarkRepo::toggle(&state.pool, user.user_id, lesson_id).await?;
    Ok(Json(DataResponse {
        data: BookmarkState {
            lesson_id,
            bookmarked,
        },
    }))
}
