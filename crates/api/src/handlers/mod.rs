pub mod admin_lessons;
pub mod admin_users;
pub mod auth;
pub mod bookmarks;
pub mod lessons;
pub mod oauth;
pub mod profile;
pub mod progress;
pub mod reflections;
