use std::path::PathBuf;

use crate::auth::cookies::CookieConfig;
use crate::auth::jwt::JwtConfig;
use crate::auth::oauth::OAuthConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public origin of the site, used to build email links and OAuth
    /// redirect URIs (default: `http://localhost:3000`).
    pub app_base_url: String,
    /// Built frontend to serve behind the page gate. API-only when unset.
    pub static_dir: Option<PathBuf>,
    /// Whether credential logins require a verified email (default: `true`).
    pub require_email_verification: bool,
    pub cookies: CookieConfig,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// OAuth client credentials. Providers without credentials are disabled.
    pub oauth: OAuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `APP_BASE_URL`               | `http://localhost:3000`    |
    /// | `STATIC_DIR`                 | unset                      |
    /// | `REQUIRE_EMAIL_VERIFICATION` | `true`                     |
    /// | `COOKIE_SECURE`              | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let app_base_url = std::env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let require_email_verification = env_flag("REQUIRE_EMAIL_VERIFICATION", true);

        let cookies = CookieConfig {
            secure: env_flag("COOKIE_SECURE", false),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_base_url,
            static_dir,
            require_email_verification,
            cookies,
            jwt: JwtConfig::from_env(),
            oauth: OAuthConfig::from_env(),
        }
    }

    /// Absolute URL for a frontend page, e.g. `url_for("/verify-email")`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.app_base_url)
    }
}

/// Parse a boolean env var (`true`/`false`/`1`/`0`), falling back to `default`.
///
/// # Panics
///
/// Panics on any other value so typos fail at startup.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Err(_) => default,
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => panic!("{name} must be true or false, got '{other}'"),
        },
    }
}
