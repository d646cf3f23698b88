//! Handlers for the signed-in user's own profile (`/me`).

use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use qt_core::account::{validate_display_name, validate_password_strength};
use qt_core::error::CoreError;
use qt_core::links::validate_web_url;
use qt_db::models::user::{UpdateProfile, User, UserResponse};
use qt_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::handlers::auth::{start_session, user_agent, AuthResponse};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /me/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Required when the account already has a password.
    pub current_password: Option<String>,
    #[validate(length(max = 256))]
    pub new_password: String,
}

async fn load_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))
}

/// PATCH /api/v1/me
///
/// Update display name and/or avatar URL. An empty `image` removes the avatar.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let input = UpdateProfile {
        name: input.name.map(|n| n.trim().to_string()),
        image: input.image.map(|i| i.trim().to_string()),
    };
    if let Some(name) = &input.name {
        validate_display_name(name)?;
    }
    if let Some(image) = input.image.as_deref().filter(|i| !i.is_empty()) {
        validate_web_url("Image URL", image)?;
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/me/password
///
/// Change (or, for OAuth-only accounts, set) the password. Other sessions are
/// revoked; the caller receives a fresh session.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    headers: HeaderMap,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<AuthResponse>>)> {
    input.validate()?;
    let user = load_user(&state, &auth).await?;

    if let Some(stored_hash) = user.password_hash.as_deref() {
        let current = input.current_password.as_deref().unwrap_or_default();
        let valid = verify_password(current, stored_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !valid {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Current password is incorrect".into(),
            )));
        }
    }
    validate_password_strength(&input.new_password)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    SessionRepo::revoke_all_for_user(&mut *state.pool.acquire().await?, user.id).await?;
    tracing::info!(user_id = user.id, "Password changed");

    let (jar, response) = start_session(&state, jar, &user, user_agent(&headers)).await?;
    Ok((jar, Json(DataResponse { data: response })))
}
