//! Handlers for OAuth sign-in (`/auth/oauth/{provider}`).
//!
//! Both endpoints are browser navigations, so failures redirect to the login
//! page with an `error` code instead of returning JSON.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use qt_core::account::validate_display_name;
use qt_core::error::CoreError;
use qt_core::gate::{DASHBOARD_PATH, LOGIN_PATH};
use qt_db::models::user::{CreateUser, User};
use qt_db::repositories::{BannedUserRepo, OAuthAccountRepo, UserRepo};
use qt_db::DbPool;
use serde::Deserialize;

use crate::auth::cookies::{removal, OAUTH_STATE_COOKIE};
use crate::auth::oauth::{
    authorize_url, exchange_code, fetch_profile, OAuthError, OAuthProfile, OAuthProvider,
};
use crate::auth::tokens::{random_token, OAUTH_STATE_LENGTH};
use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query};
use crate::handlers::auth::{start_session, user_agent};
use crate::state::AppState;

/// Query string the provider sends back to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set when the user denied consent.
    pub error: Option<String>,
}

/// Why an OAuth sign-in ended on the login page. The code is passed as `?error=`.
#[derive(Debug)]
enum CallbackFailure {
    State,
    Denied,
    Provider(OAuthError),
    Banned,
    NotLinked,
    Server(AppError),
}

impl CallbackFailure {
    fn code(&self) -> &'static str {
        match self {
            CallbackFailure::State => "oauth_state",
            CallbackFailure::Denied => "oauth_denied",
            CallbackFailure::Provider(_) => "oauth_failed",
            CallbackFailure::Banned => "banned",
            CallbackFailure::NotLinked => "account_not_linked",
            CallbackFailure::Server(_) => "server_error",
        }
    }
}

impl From<AppError> for CallbackFailure {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Core(CoreError::Forbidden(_)) => CallbackFailure::Banned,
            AppError::Core(CoreError::Conflict(_)) => CallbackFailure::NotLinked,
            other => CallbackFailure::Server(other),
        }
    }
}

fn redirect_uri(state: &AppState, provider: OAuthProvider) -> String {
    state
        .config
        .url_for(&format!("/api/v1/auth/oauth/{provider}/callback"))
}

/// GET /api/v1/auth/oauth/{provider}
///
/// Redirect (303) to the provider's consent page with a fresh `state`.
pub async fn start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    let provider: OAuthProvider = provider
        .parse()
        .map_err(|e: OAuthError| AppError::BadRequest(e.to_string()))?;
    let creds = state
        .config
        .oauth
        .credentials(provider)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let csrf_state = random_token(OAUTH_STATE_LENGTH);
    let url = authorize_url(provider, creds, &redirect_uri(&state, provider), &csrf_state)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let jar = jar.add(
        state
            .config
            .cookies
            .oauth_state(format!("{provider}:{csrf_state}")),
    );
    Ok((jar, Redirect::to(&url)))
}

/// GET /api/v1/auth/oauth/{provider}/callback
///
/// Verify `state`, exchange the code, sign the user in and redirect (303) to
/// the dashboard, or to `/login?error=<code>` on failure.
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(removal(OAUTH_STATE_COOKIE));

    match complete_sign_in(&state, &provider, params, expected_state, jar.clone(), &headers).await
    {
        Ok(jar) => (jar, Redirect::to(DASHBOARD_PATH)).into_response(),
        Err(failure) => {
            match &failure {
                CallbackFailure::Provider(e) => {
                    tracing::warn!(provider = %provider, error = %e, "OAuth provider error")
                }
                CallbackFailure::Server(e) => {
                    tracing::error!(provider = %provider, error = %e, "OAuth sign-in failed")
                }
                other => tracing::info!(provider = %provider, code = other.code(), "OAuth sign-in rejected"),
            }
            let to = format!("{LOGIN_PATH}?error={}", failure.code());
            (jar, Redirect::to(&to)).into_response()
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    provider: &str,
    params: CallbackParams,
    expected_state: Option<String>,
    jar: CookieJar,
    headers: &HeaderMap,
) -> Result<CookieJar, CallbackFailure> {
    let provider: OAuthProvider = provider.parse().map_err(CallbackFailure::Provider)?;

    if params.error.is_some() {
        return Err(CallbackFailure::Denied);
    }

    let returned = params.state.ok_or(CallbackFailure::State)?;
    if expected_state.as_deref() != Some(format!("{provider}:{returned}").as_str()) {
        return Err(CallbackFailure::State);
    }
    let code = params.code.ok_or(CallbackFailure::State)?;

    let creds = state
        .config
        .oauth
        .credentials(provider)
        .map_err(CallbackFailure::Provider)?;
    let access_token = exchange_code(
        &state.http,
        provider,
        creds,
        &redirect_uri(state, provider),
        &code,
    )
    .await
    .map_err(CallbackFailure::Provider)?;
    let profile = fetch_profile(&state.http, provider, &access_token)
        .await
        .map_err(CallbackFailure::Provider)?;

    let user = resolve_oauth_user(&state.pool, &profile).await?;
    UserRepo::record_successful_login(&state.pool, user.id)
        .await
        .map_err(AppError::from)?;

    let (jar, _) = start_session(state, jar, &user, user_agent(&headers)).await?;
    tracing::info!(user_id = user.id, provider = %provider, "User signed in with OAuth");
    Ok(jar)
}

/// Find or create the local user for a provider identity.
///
/// 1. A linked identity signs in its user.
/// 2. Otherwise an existing account with the same email is linked, but only
///    when the provider vouches for the address (409 otherwise).
/// 3. Otherwise a new password-less user is created, verified when the
///    provider vouches for the address.
///
/// Banned addresses and banned users are rejected with 403.
pub async fn resolve_oauth_user(pool: &DbPool, profile: &OAuthProfile) -> AppResult<User> {
    let provider = profile.provider.as_str();
    if BannedUserRepo::is_banned(pool, &profile.email).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "This email address has been banned".into(),
        )));
    }

    let linked = OAuthAccountRepo::find(pool, provider, &profile.provider_account_id).await?;
    let user = match linked {
        Some(link) => UserRepo::find_by_id(pool, link.user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: link.user_id,
            })?,
        None => match UserRepo::find_by_email(pool, &profile.email).await? {
            Some(existing) => {
                if !profile.email_verified {
                    return Err(AppError::Core(CoreError::Conflict(
                        "Sign in with your existing method to link this account".into(),
                    )));
                }
                OAuthAccountRepo::link(pool, existing.id, provider, &profile.provider_account_id)
                    .await?;
                if !existing.is_verified() {
                    UserRepo::mark_email_verified(pool, existing.id).await?;
                }
                tracing::info!(user_id = existing.id, provider, "Linked OAuth identity");
                existing
            }
            None => {
                let user = UserRepo::create(
                    pool,
                    &CreateUser {
                        name: display_name_for(profile),
                        email: profile.email.clone(),
                        password_hash: None,
                        image: profile.image.clone(),
                        email_verified: profile.email_verified,
                    },
                )
                .await?;
                OAuthAccountRepo::link(pool, user.id, provider, &profile.provider_account_id)
                    .await?;
                tracing::info!(user_id = user.id, provider, "User registered with OAuth");
                user
            }
        },
    };

    if user.is_banned {
        return Err(AppError::Core(CoreError::Forbidden(
            "This account has been banned".into(),
        )));
    }
    Ok(user)
}

/// Provider name if usable, otherwise the local part of the email.
fn display_name_for(profile: &OAuthProfile) -> String {
    profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| validate_display_name(n).is_ok())
        .map(str::to_string)
        .unwrap_or_else(|| {
            profile
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        })
}
