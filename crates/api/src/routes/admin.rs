//! Route definitions for the admin back-office.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin_lessons, admin_users};
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the `ADMIN` role.
///
/// ```text
/// GET, POST    /lessons            -> list_lessons, create_lesson
/// PUT, DELETE  /lessons/{id}       -> update_lesson, delete_lesson
/// GET          /users              -> list_users
/// GET          /users/{id}         -> get_user
/// PUT          /users/{id}/role    -> set_role
/// POST, DELETE /users/{id}/ban     -> ban, unban
/// GET, POST    /bans               -> list_bans, ban_email
/// DELETE       /bans/{email}       -> unban_email
/// GET          /stats              -> stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/lessons",
            get(admin_lessons::list_lessons).post(admin_lessons::create_lesson),
        )
        .route(
            "/lessons/{id}",
            put(admin_lessons::update_lesson).delete(admin_lessons::delete_lesson),
        )
        .route("/users", get(admin_users::list_users))
        .route("/users/{id}", get(admin_users::get_user))
        .route("/users/{id}/role", put(admin_users::set_role))
        .route(
            "/users/{id}/ban",
            post(admin_users::ban).delete(admin_users::unban),
        )
        .route(
            "/bans",
            get(admin_users::list_bans).post(admin_users::ban_email),
        )
        .route("/bans/{email}", delete(admin_users::unban_email))
        .route("/stats", get(admin_users::stats))
}
