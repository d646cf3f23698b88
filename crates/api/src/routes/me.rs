//! Routes scoped to the signed-in user.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{bookmarks, profile, progress, reflections};
use crate::state::AppState;

/// Routes merged at the `/api/v1` root. All require auth.
///
/// ```text
/// PATCH /me                   -> update_profile
/// POST  /me/password          -> change_password
/// GET   /reflections          -> list_mine
/// GET   /reflections/export   -> export
/// GET   /bookmarks            -> list_bookmarks
/// GET   /progress             -> list_progress
/// GET   /progress/recent      -> recent
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", patch(profile::update_profile))
        .route("/me/password", post(profile::change_password))
        .route("/reflections", get(reflections::list_mine))
        .route("/reflections/export", get(reflections::export))
        .route("/bookmarks", get(bookmarks::list_bookmarks))
        .route("/progress", get(progress::list_progress))
        .route("/progress/recent", get(progress::recent))
}
