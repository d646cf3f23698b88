//! Reflection (user note) model and DTOs.

use qt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reflections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reflection {
    pub id: DbId,
    pub user_id: DbId,
    pub lesson_id: DbId,
    pub content: String,
    pub direction: String,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A reflection joined with its lesson, for the "my notes" list and export.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReflectionWithLesson {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reflection: Reflection,
    pub lesson_title: String,
    pub lesson_part: String,
    pub lesson_urdu_title: Option<String>,
}

/// Another user's public reflection on a lesson.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicReflection {
    pub id: DbId,
    pub author_name: String,
    pub content: String,
    pub direction: String,
    pub updated_at: Timestamp,
}

/// Validated input for creating or replacing a user's reflection on a lesson.
#[derive(Debug, Clone)]
pub struct UpsertReflection {
    pub content: String,
    pub direction: String,
    pub is_public: bool,
}
