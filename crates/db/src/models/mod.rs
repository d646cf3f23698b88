//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and partial updates
//! - Joined read models for list endpoints where needed

pub mod auth_token;
pub mod banned_user;
pub mod bookmark;
pub mod lesson;
pub mod oauth_account;
pub mod progress;
pub mod reflection;
pub mod session;
pub mod stats;
pub mod user;
