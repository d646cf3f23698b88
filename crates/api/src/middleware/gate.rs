//! Page gate middleware.
//!
//! Applies [`qt_core::gate::gate_decision`] to every request outside the API
//! and the health check, static files included: a file under `/admin` is as
//! protected as the page.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use qt_core::gate::{gate_decision, GateDecision};

use crate::middleware::auth::session_claims;
use crate::state::AppState;

/// Paths that are never page navigations.
fn is_ungated(path: &str) -> bool {
    path.starts_with("/api/") || path == "/api" || path == "/health"
}

pub async fn page_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_ungated(&path) {
        return next.run(request).await;
    }

    let role = session_claims(request.headers(), &state.config.jwt).map(|c| c.role);
    match gate_decision(&path, role) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!(path = %path, to = %to, "Page gate redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}
