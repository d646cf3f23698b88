//! Handlers for `/admin/users`, `/admin/bans` and `/admin/stats`.
//!
//! All handlers require the `ADMIN` role via [`RequireAdmin`]. An admin cannot
//! change their own role or ban themselves.

use axum::extract::State;
use axum::http::StatusCode;
use qt_core::account::{normalize_email, validate_email};
use qt_core::error::CoreError;
use qt_core::roles::Role;
use qt_core::types::DbId;
use qt_db::models::banned_user::BannedUser;
use qt_db::models::stats::AdminStats;
use qt_db::models::user::{User, UserResponse};
use qt_db::repositories::{
    BannedUserRepo, OAuthAccountRepo, SessionRepo, StatsRepo, UserRepo,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Request body for `POST /admin/users/{id}/ban`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct BanRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Request body for `POST /admin/bans`.
#[derive(Debug, Deserialize, Validate)]
pub struct BanEmailRequest {
    pub email: String,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// A user with their linked sign-in providers.
#[derive(Debug, Serialize)]
pub struct AdminUserDetail {
    #[serde(flatten)]
    pub user: UserResponse,
    pub providers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

fn forbid_self(admin: &AuthUser, target: DbId, action: &str) -> AppResult<()> {
    if admin.user_id == target {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "You cannot {action} your own account"
        ))));
    }
    Ok(())
}

fn clean_reason(reason: Option<String>) -> Option<String> {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

/// Ban a user: list the email, flag the row and end every session, in one
/// transaction. Returns the ban-list entry.
async fn ban_user(
    state: &AppState,
    admin: &AuthUser,
    user: &User,
    reason: Option<&str>,
) -> AppResult<BannedUser> {
    let mut tx = state.pool.begin().await?;
    let entry = BannedUserRepo::ban(&mut tx, &user.email, reason, admin.user_id).await?;
    UserRepo::set_banned(&mut tx, user.id, true).await?;
    let revoked = SessionRepo::revoke_all_for_user(&mut tx, user.id).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        admin_id = admin.user_id,
        revoked,
        "User banned"
    );
    Ok(entry)
}

/// Remove `email` from the ban list and clear the flag on `user`, in one
/// transaction. A 400 when neither the address nor the account is banned.
async fn lift_ban(state: &AppState, email: &str, user: Option<&User>) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;
    let listed = BannedUserRepo::unban(&mut tx, email).await?;
    let flagged = match user.filter(|u| u.is_banned) {
        Some(user) => UserRepo::set_banned(&mut tx, user.id, false).await?.is_some(),
        None => false,
    };
    if !listed && !flagged {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{email} is not banned"
        ))));
    }
    tx.commit().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users?limit=&offset=
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = page.clamped();
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AdminUserDetail>>> {
    let (user, accounts) = tokio::try_join!(
        UserRepo::find_by_id(&state.pool, id),
        OAuthAccountRepo::list_for_user(&state.pool, id),
    )?;
    let user = user.ok_or(CoreError::NotFound { entity: "User", id })?;

    let mut providers: Vec<String> = accounts.into_iter().map(|a| a.provider).collect();
    if user.password_hash.is_some() {
        providers.insert(0, "credentials".to_string());
    }

    Ok(Json(DataResponse {
        data: AdminUserDetail {
            user: UserResponse::from(&user),
            providers,
        },
    }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// The user's sessions are revoked so the new role applies at next sign-in
/// (or when the current access token expires).
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    forbid_self(&admin, id, "change the role of")?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::set_role(&mut tx, id, input.role.as_str())
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    SessionRepo::revoke_all_for_user(&mut tx, id).await?;
    tx.commit().await?;
    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        role = %input.role,
        "User role changed"
    );

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/admin/users/{id}/ban
pub async fn ban(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    body: Option<Json<BanRequest>>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    input.validate()?;
    forbid_self(&admin, id, "ban")?;

    let user = find_user(&state, id).await?;
    let reason = clean_reason(input.reason);
    ban_user(&state, &admin, &user, reason.as_deref()).await?;

    let user = find_user(&state, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /api/v1/admin/users/{id}/ban
///
/// 400 when the user is neither flagged nor on the ban list.
pub async fn unban(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    lift_ban(&state, &user.email, Some(&user)).await?;
    let user = find_user(&state, id).await?;
    tracing::info!(user_id = id, admin_id = admin.user_id, "User unbanned");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// Ban list
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/bans
pub async fn list_bans(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<BannedUser>>>> {
    let bans = BannedUserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: bans }))
}

/// POST /api/v1/admin/bans
///
/// Ban an email address, whether or not an account exists for it yet. An
/// existing account is banned as well.
pub async fn ban_email(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<BanEmailRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BannedUser>>)> {
    input.validate()?;
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    if email == admin.email {
        return Err(AppError::Core(CoreError::Conflict(
            "You cannot ban your own account".into(),
        )));
    }
    let reason = clean_reason(input.reason);

    let entry = match UserRepo::find_by_email(&state.pool, &email).await? {
        Some(user) => ban_user(&state, &admin, &user, reason.as_deref()).await?,
        None => {
            let mut conn = state.pool.acquire().await?;
            let entry =
                BannedUserRepo::ban(&mut conn, &email, reason.as_deref(), admin.user_id).await?;
            tracing::info!(admin_id = admin.user_id, "Email address banned");
            entry
        }
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// DELETE /api/v1/admin/bans/{email}
///
/// Remove an address from the ban list and lift the ban on its account, if any.
pub async fn unban_email(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(email): Path<String>,
) -> AppResult<StatusCode> {
    let email = normalize_email(&email);
    let user = UserRepo::find_by_email(&state.pool, &email).await?;
    lift_ban(&state, &email, user.as_ref()).await?;
    tracing::info!(admin_id = admin.user_id, "Email address unbanned");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AdminStats>>> {
    let stats = StatsRepo::admin_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
