//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, oauth};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register                   -> register
/// POST /login                      -> login
/// POST /refresh                    -> refresh
/// POST /logout                     -> logout
/// GET  /me                         -> me (requires auth)
/// POST /verify-email               -> verify_email
/// POST /resend-verification        -> resend_verification
/// POST /forgot-password            -> forgot_password
/// POST /reset-password             -> reset_password
/// GET  /oauth/{provider}           -> oauth::start
/// GET  /oauth/{provider}/callback  -> oauth::callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/oauth/{provider}", get(oauth::start))
        .route("/oauth/{provider}/callback", get(oauth::callback))
}
