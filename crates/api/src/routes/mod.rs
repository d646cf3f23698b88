pub mod admin;
pub mod auth;
pub mod health;
pub mod lessons;
pub mod me;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (refresh cookie)
/// /auth/logout                                     logout
/// /auth/me                                         current user
/// /auth/verify-email                               consume verification token
/// /auth/resend-verification                        resend verification mail
/// /auth/forgot-password                            request reset mail
/// /auth/reset-password                             consume reset token
/// /auth/oauth/{provider}                           redirect to provider
/// /auth/oauth/{provider}/callback                  provider callback
///
/// /me                                              update profile (PATCH)
/// /me/password                                     change password (POST)
/// /reflections                                     own reflections
/// /reflections/export                              HTML export
/// /bookmarks                                       own bookmarks
/// /progress                                        own progress
/// /progress/recent                                 most recently watched
///
/// /lessons                                         visible lessons (?part=&q=)
/// /lessons/parts                                   parts with lesson counts
/// /lessons/{id}                                    lesson detail
/// /lessons/{id}/reflection                         get, save, delete own reflection
/// /lessons/{id}/reflections/public                 shared reflections
/// /lessons/{id}/bookmark                           toggle bookmark (POST)
/// /lessons/{id}/progress                           save progress (PUT)
///
/// /admin/lessons                                   list, create (admin only)
/// /admin/lessons/{id}                              update, delete
/// /admin/users                                     list
/// /admin/users/{id}                                detail
/// /admin/users/{id}/role                           change role (PUT)
/// /admin/users/{id}/ban                            ban (POST), unban (DELETE)
/// /admin/bans                                      list, ban address (GET, POST)
/// /admin/bans/{email}                              lift address ban (DELETE)
/// /admin/stats                                     dashboard counts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/lessons", lessons::router())
        .nest("/admin", admin::router())
        .merge(me::router())
}
