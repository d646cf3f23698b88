//! Handlers for the `/auth` resource: registration, login, session refresh,
//! logout, email verification and password reset.

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use qt_core::account::{
    normalize_email, validate_display_name, validate_email, validate_password_strength,
};
use qt_core::error::CoreError;
use qt_db::models::auth_token::{PURPOSE_RESET_PASSWORD, PURPOSE_VERIFY_EMAIL};
use qt_db::models::session::CreateSession;
use qt_db::models::user::{CreateUser, User, UserResponse};
use qt_db::repositories::{AuthTokenRepo, BannedUserRepo, SessionRepo, UserRepo};
use qt_mail::templates::{password_reset_email, verification_email};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::cookies::{clear_session, REFRESH_COOKIE};
use crate::auth::jwt::{generate_access_token, generate_refresh_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{generate_email_token, hash_token};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
pub const LOCK_DURATION_MINS: i64 = 15;

/// Lifetime of an email verification link.
pub const VERIFY_TOKEN_HOURS: i64 = 24;

/// Lifetime of a password reset link.
pub const RESET_TOKEN_MINUTES: i64 = 60;

/// Upper bound on password input, keeping Argon2 work bounded.
const MAX_PASSWORD_INPUT: u64 = 256;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const BANNED: &str = "This account has been banned";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[validate(length(max = MAX_PASSWORD_INPUT))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: String,
    #[validate(length(max = MAX_PASSWORD_INPUT))]
    pub password: String,
}

/// Request body for endpoints that take only an email address.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Request body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(max = MAX_PASSWORD_INPUT))]
    pub password: String,
}

/// Returned by login, refresh and password change. Cookies carry the same
/// session; the access token is echoed for non-browser clients.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Acknowledgement for flows that must not reveal whether an account exists.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a credentials account. The user must verify their email before
/// signing in (unless verification is disabled).
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    let email = normalize_email(&input.email);
    let name = input.name.trim().to_string();
    validate_display_name(&name)?;
    validate_email(&email)?;
    validate_password_strength(&input.password)?;

    if BannedUserRepo::is_banned(&state.pool, &email).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "This email address has been banned".into(),
        )));
    }
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name,
            email,
            password_hash: Some(password_hash),
            image: None,
            email_verified: !state.config.require_email_verification,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    if !user.is_verified() {
        // The account exists either way; the user can ask for a new link.
        if let Err(e) = send_verification(&state, &user).await {
            tracing::error!(user_id = user.id, error = %e, "Failed to send verification email");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Sets the session and refresh cookies.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<AuthResponse>>)> {
    input.validate()?;
    let email = normalize_email(&input.email);

    // 1. Banned addresses are rejected before any credential check.
    if BannedUserRepo::is_banned(&state.pool, &email).await? {
        return Err(AppError::Core(CoreError::Forbidden(BANNED.into())));
    }

    // 2. Unknown email and OAuth-only accounts get the same answer as a wrong password.
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    if user.is_banned {
        return Err(AppError::Core(CoreError::Forbidden(BANNED.into())));
    }

    // 3. Temporary lock-out.
    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let Some(stored_hash) = user.password_hash.as_deref() else {
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    };

    // 4. Verify password.
    let password_valid = verify_password(&input.password, stored_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 5. On failure: increment counter, lock if threshold reached.
        let new_count = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    // 6. Only a correct password learns that the email is unverified.
    if state.config.require_email_verification && !user.is_verified() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Please verify your email address before signing in".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let (jar, response) = start_session(&state, jar, &user, user_agent(&headers)).await?;
    tracing::info!(user_id = user.id, "User signed in");
    Ok((jar, Json(DataResponse { data: response })))
}

/// POST /api/v1/auth/refresh
///
/// Rotate the refresh session from the `qt_refresh` cookie and issue a new
/// access token. Each refresh token can be exchanged once.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<(CookieJar, Json<DataResponse<AuthResponse>>)> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Not signed in".into())))?;

    let session = SessionRepo::take_by_refresh_token_hash(&state.pool, &hash_token(&token))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if user.is_banned || BannedUserRepo::is_banned(&state.pool, &user.email).await? {
        SessionRepo::revoke_all_for_user(&mut *state.pool.acquire().await?, user.id).await?;
        return Err(AppError::Core(CoreError::Forbidden(BANNED.into())));
    }

    let (jar, response) = start_session(&state, jar, &user, user_agent(&headers)).await?;
    Ok((jar, Json(DataResponse { data: response })))
}

/// POST /api/v1/auth/logout
///
/// Revoke the caller's sessions and clear cookies. Works with an expired
/// access token as long as the refresh cookie is present. Returns 204.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<(CookieJar, StatusCode)> {
    if let Some(user) = user {
        SessionRepo::revoke_all_for_user(&mut *state.pool.acquire().await?, user.user_id).await?;
        tracing::info!(user_id = user.user_id, "User signed out");
    } else if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        SessionRepo::take_by_refresh_token_hash(&state.pool, &hash_token(cookie.value())).await?;
    }
    Ok((clear_session(jar), StatusCode::NO_CONTENT))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/auth/verify-email
///
/// Consume a verification token from an emailed link.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(input): Json<VerifyEmailRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let token = AuthTokenRepo::consume(&state.pool, PURPOSE_VERIFY_EMAIL, &hash_token(&input.token))
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired verification link".into()))?;

    UserRepo::mark_email_verified(&state.pool, token.user_id).await?;
    let user = UserRepo::find_by_id(&state.pool, token.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: token.user_id,
        })?;
    tracing::info!(user_id = user.id, "Email verified");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/auth/resend-verification
///
/// Always answers 200 so the endpoint cannot be used to discover accounts.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let email = normalize_email(&input.email);
    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        if !user.is_verified() && !user.is_banned {
            if let Err(e) = send_verification(&state, &user).await {
                tracing::error!(user_id = user.id, error = %e, "Failed to resend verification email");
            }
        }
    }
    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "If an unverified account exists for this email, a new link has been sent",
        },
    }))
}

/// POST /api/v1/auth/forgot-password
///
/// Email a single-use reset link. Always answers 200.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let email = normalize_email(&input.email);
    let user = UserRepo::find_by_email(&state.pool, &email).await?;

    if let Some(user) = user.filter(|u| !u.is_banned) {
        AuthTokenRepo::invalidate_for_user(&state.pool, user.id, PURPOSE_RESET_PASSWORD).await?;
        let (token, hash) = generate_email_token();
        let expires_at = Utc::now() + chrono::Duration::minutes(RESET_TOKEN_MINUTES);
        AuthTokenRepo::create(&state.pool, user.id, PURPOSE_RESET_PASSWORD, &hash, expires_at)
            .await?;

        let link = state
            .config
            .url_for(&format!("/reset-password?token={token}"));
        let mail = password_reset_email(&user.email, &user.name, &link, RESET_TOKEN_MINUTES);
        // Failures are logged, never reported: the answer must not depend on the account.
        if let Err(e) = state.mailer.send(mail).await {
            tracing::error!(user_id = user.id, error = %e, "Failed to send password reset email");
        }
        tracing::info!(user_id = user.id, "Password reset requested");
    }

    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "If an account exists for this email, a reset link has been sent",
        },
    }))
}

/// POST /api/v1/auth/reset-password
///
/// Set a new password from a reset link. Signs the user out everywhere.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    input.validate()?;
    validate_password_strength(&input.password)?;

    let token =
        AuthTokenRepo::consume(&state.pool, PURPOSE_RESET_PASSWORD, &hash_token(&input.token))
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired reset link".into()))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, token.user_id, &password_hash).await?;

    // Receiving the link proves ownership of the address.
    UserRepo::mark_email_verified(&state.pool, token.user_id).await?;
    AuthTokenRepo::invalidate_for_user(&state.pool, token.user_id, PURPOSE_RESET_PASSWORD).await?;
    SessionRepo::revoke_all_for_user(&mut *state.pool.acquire().await?, token.user_id).await?;
    tracing::info!(user_id = token.user_id, "Password reset");

    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "Password updated. Please sign in with your new password",
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The `User-Agent` header, capped at 512 characters, for session records.
pub(crate) fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(512).collect())
}

/// Issue an access token and a refresh session for `user`, and set both cookies.
pub async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    user_agent: Option<String>,
) -> AppResult<(CookieJar, AuthResponse)> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.email, user.role(), jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
            user_agent,
        },
    )
    .await?;

    let cookies = &state.config.cookies;
    let jar = jar
        .add(cookies.session(access_token.clone(), jwt))
        .add(cookies.refresh(refresh_plaintext, jwt));

    Ok((
        jar,
        AuthResponse {
            user: UserResponse::from(user),
            access_token,
            expires_in: jwt.access_token_expiry_mins * 60,
        },
    ))
}

/// Replace any outstanding verification link for `user` with a new one and email it.
pub async fn send_verification(state: &AppState, user: &User) -> AppResult<()> {
    AuthTokenRepo::invalidate_for_user(&state.pool, user.id, PURPOSE_VERIFY_EMAIL).await?;
    let (token, hash) = generate_email_token();
    let expires_at = Utc::now() + chrono::Duration::hours(VERIFY_TOKEN_HOURS);
    AuthTokenRepo::create(&state.pool, user.id, PURPOSE_VERIFY_EMAIL, &hash, expires_at).await?;

    let link = state.config.url_for(&format!("/verify-email?token={token}"));
    state
        .mailer
        .send(verification_email(
            &user.email,
            &user.name,
            &link,
            VERIFY_TOKEN_HOURS,
        ))
        .await?;
    Ok(())
}
