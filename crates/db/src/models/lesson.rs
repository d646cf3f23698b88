//! Lesson entity model and DTOs.

use qt_core::roles::Role;
use qt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lessons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub title: String,
    pub part: String,
    pub urdu_title: Option<String>,
    pub description: String,
    pub reference: Option<String>,
    pub presentation_url: Option<String>,
    pub min_role: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lesson {
    pub fn min_role(&self) -> Role {
        // Unknown values gate as admin-only rather than leaking the lesson.
        self.min_role.parse().unwrap_or(Role::Admin)
    }

    /// Fields searched by the lesson filter.
    pub fn search_fields(&self) -> [Option<&str>; 5] {
        [
            Some(self.title.as_str()),
            Some(self.part.as_str()),
            self.urdu_title.as_deref(),
            Some(self.description.as_str()),
            self.reference.as_deref(),
        ]
    }
}

/// A lesson joined with the caller's bookmark/reflection/progress status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonWithStatus {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lesson: Lesson,
    pub is_bookmarked: bool,
    pub has_reflection: bool,
    pub completed: bool,
}

/// Number of lessons in each syllabus part.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartSummary {
    pub part: String,
    pub lesson_count: i64,
}

/// DTO for creating a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLesson {
    pub title: String,
    pub part: String,
    pub urdu_title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub reference: Option<String>,
    pub presentation_url: Option<String>,
    pub min_role: Option<Role>,
    pub sort_order: Option<i32>,
}

/// DTO for updating a lesson. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub part: Option<String>,
    pub urdu_title: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub presentation_url: Option<String>,
    pub min_role: Option<Role>,
    pub sort_order: Option<i32>,
}
