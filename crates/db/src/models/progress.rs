//! Lesson progress model and DTOs.

use qt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub lesson_id: DbId,
    pub position_secs: i32,
    pub completed: bool,
    pub last_accessed_at: Timestamp,
}

/// Progress joined with the lesson title, for dashboards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressWithLesson {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub progress: UserProgress,
    pub lesson_title: String,
    pub lesson_part: String,
}

/// DTO for recording progress on a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProgress {
    #[serde(default)]
    pub position_secs: i32,
    #[serde(default)]
    pub completed: bool,
}
