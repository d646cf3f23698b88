use std::sync::Arc;

use qt_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: qt_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outgoing email (SMTP, log-only, or in-memory for tests).
    pub mailer: Arc<Mailer>,
    /// HTTP client for OAuth provider calls.
    pub http: reqwest::Client,
}
