//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` (or `&mut PgConnection` inside a transaction) as the
//! first argument.

pub mod auth_token_repo;
pub mod banned_user_repo;
pub mod bookmark_repo;
pub mod lesson_repo;
pub mod oauth_account_repo;
pub mod progress_repo;
pub mod reflection_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod user_repo;

pub use auth_token_repo::AuthTokenRepo;
pub use banned_user_repo::BannedUserRepo;
pub use bookmark_repo::BookmarkRepo;
pub use lesson_repo::LessonRepo;
pub use oauth_account_repo::OAuthAccountRepo;
pub use progress_repo::ProgressRepo;
pub use reflection_repo::ReflectionRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
