//! Bookmark model.

use qt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::lesson::Lesson;

/// A row from the `bookmarks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bookmark {
    pub id: DbId,
    pub user_id: DbId,
    pub lesson_id: DbId,
    pub created_at: Timestamp,
}

/// A bookmarked lesson with the time it was saved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookmarkedLesson {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lesson: Lesson,
    pub bookmarked_at: Timestamp,
}
