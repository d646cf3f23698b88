//! Aggregate queries for the admin dashboard.

use sqlx::PgPool;

use crate::models::stats::AdminStats;

pub struct StatsRepo;

impl StatsRepo {
    pub async fn admin_stats(pool: &PgPool) -> Result<AdminStats, sqlx::Error> {
        sqlx::query_as::<_, AdminStats>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS user_count,
                (SELECT COUNT(*) FROM users WHERE role = 'ADMIN') AS admin_count,
                (SELECT COUNT(*) FROM banned_users) AS banned_count,
                (SELECT COUNT(*) FROM lessons) AS lesson_count,
                (SELECT COUNT(*) FROM reflections) AS reflection_count,
                (SELECT COUNT(*) FROM bookmarks) AS bookmark_count",
        )
        .fetch_one(pool)
        .await
    }
}
