//! Route definitions for the `/lessons` resource and its per-user children.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{bookmarks, lessons, progress, reflections};
use crate::state::AppState;

/// Routes mounted at `/lessons`. All require auth.
///
/// ```text
/// GET                          /                        -> list_lessons
/// GET                          /parts                   -> list_parts
/// GET                          /{id}                    -> get_lesson
/// GET, PUT, DELETE             /{id}/reflection         -> get, save, delete own reflection
/// GET                          /{id}/reflections/public -> list_public
/// POST                         /{id}/bookmark           -> toggle_bookmark
/// PUT                          /{id}/progress           -> save_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lessons::list_lessons))
        .route("/parts", get(lessons::list_parts))
        .route("/{id}", get(lessons::get_lesson))
        .route(
            "/{id}/reflection",
            get(reflections::get_reflection)
                .put(reflections::save_reflection)
                .delete(reflections::delete_reflection),
        )
        .route("/{id}/reflections/public", get(reflections::list_public))
        .route("/{id}/bookmark", post(bookmarks::toggle_bookmark))
        .route("/{id}/progress", put(progress::save_progress))
}
