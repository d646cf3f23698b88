//! User entity model and DTOs.

use chrono::NaiveDate;
use qt_core::roles::Role;
use qt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// `None` for accounts created through OAuth only.
    pub password_hash: Option<String>,
    pub image: Option<String>,
    pub role: String,
    pub email_verified_at: Option<Timestamp>,
    pub is_banned: bool,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub points: i32,
    pub reflection_count: i32,
    pub streak_days: i32,
    pub last_active_on: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parsed role. The `ck_users_role` constraint keeps the column valid;
    /// anything unexpected degrades to the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }

    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// Safe user representation for API responses (no password hash or lockout state).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Role,
    pub email_verified: bool,
    pub is_banned: bool,
    pub has_password: bool,
    pub points: i32,
    pub reflection_count: i32,
    pub streak_days: i32,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
            role: user.role(),
            email_verified: user.is_verified(),
            is_banned: user.is_banned,
            has_password: user.password_hash.is_some(),
            points: user.points,
            reflection_count: user.reflection_count,
            streak_days: user.streak_days,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    /// Must already be normalized (see `qt_core::account::normalize_email`).
    pub email: String,
    pub password_hash: Option<String>,
    pub image: Option<String>,
    /// OAuth accounts arrive with a provider-verified address.
    pub email_verified: bool,
}

/// DTO for a user editing their own profile. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub image: Option<String>,
}
