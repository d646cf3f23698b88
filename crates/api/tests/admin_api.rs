//! HTTP-level integration tests for the admin back-office.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, cookie_value, create_lesson, create_user, delete_auth, get_auth, login, post_json,
    post_json_auth, put_json_auth, send, Auth, TEST_PASSWORD,
};
use qt_api::auth::cookies::REFRESH_COOKIE;
use qt_core::roles::Role;
use qt_db::repositories::{BannedUserRepo, LessonRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_require_admin(pool: PgPool) {
    create_user(&pool, "student@example.com", Role::User).await;
    let (app, _outbox) = common::build_test_app(pool);

    let response = send(app.clone(), Method::GET, "/api/v1/admin/stats", None, Auth::None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = login(app.clone(), "student@example.com").await;
    for uri in ["/api/v1/admin/stats", "/api/v1/admin/users", "/api/v1/admin/lessons", "/api/v1/admin/bans"] {
        let response = get_auth(app.clone(), uri, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri} should be admin-only");
    }
}

// ---------------------------------------------------------------------------
// Lessons
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lesson_crud(pool: PgPool) {
    create_user(&pool, "admin@example.com", Role::Admin).await;
    let (app, _outbox) = common::build_test_app(pool.clone());
    let token = login(app.clone(), "admin@example.com").await;

    let body = json!({
        "title": "  Al-Mulk  ",
        "part": "Part 5",
        "urdu_title": "سورۃ الملک",
        "presentation_url": "https://slides.example.com/mulk",
        "min_role": "ADMIN"
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/lessons", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["title"], "Al-Mulk");
    assert_eq!(json["data"]["min_role"], "ADMIN");
    assert_eq!(json["data"]["description"], "");

    let uri = format!("/api/v1/admin/lessons/{id}");
    let body = json!({ "description": "Sovereignty", "presentation_url": "" });
    let response = put_json_auth(app.clone(), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["description"], "Sovereignty");
    assert!(json["data"]["presentation_url"].is_null());
    assert_eq!(json["data"]["urdu_title"], "سورۃ الملک");

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/lessons", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(LessonRepo::find_by_id(&pool, id).await.unwrap().is_none());

    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lesson_validation(pool: PgPool) {
    create_user(&pool, "admin@example.com", Role::Admin).await;
    let lesson = create_lesson(&pool, "Al-Fil", "Part 6", Role::User).await;
    let (app, _outbox) = common::build_test_app(pool);
    let token = login(app.clone(), "admin@example.com").await;

    let body = json!({ "title": "", "part": "Part 1" });
    let response = post_json_auth(app.clone(), "/api/v1/admin/lessons", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "title": "Slides", "part": "Part 1", "presentation_url": "javascript:alert(1)" });
    let response = post_json_auth(app.clone(), "/api/v1/admin/lessons", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/admin/lessons/{}", lesson.id);
    let response = put_json_auth(app.clone(), &uri, json!({ "sort_order": -1 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(app, "/api/v1/admin/lessons/999999", json!({ "title": "x" }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lists_and_inspects_users(pool: PgPool) {
    create_user(&pool, "admin@example.com", Role::Admin).await;
    let student = create_user(&pool, "student@example.com", Role::User).await;
    let (app, _outbox) = common::build_test_app(pool);
    let token = login(app.clone(), "admin@example.com").await;

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/users?limit=1", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/admin/users/{}", student.id);
    let json = body_json(get_auth(app.clone(), &uri, &token).await).await;
    assert_eq!(json["data"]["email"], "student@example.com");
    assert_eq!(json["data"]["providers"], json!(["credentials"]));
    assert!(json["data"].get("password_hash").is_none());

    let response = get_auth(app.clone(), "/api/v1/admin/users/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get_auth(app, "/api/v1/admin/stats", &token).await).await;
    assert_eq!(json["data"]["user_count"], 2);
    assert_eq!(json["data"]["admin_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_changes_role(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", Role::Admin).await;
    let student = create_user(&pool, "student@example.com", Role::User).await;
    let (app, _outbox) = common::build_test_app(pool.clone());
    let token = login(app.clone(), "admin@example.com").await;

    let uri = format!("/api/v1/admin/users/{}/role", student.id);
    let response = put_json_auth(app.clone(), &uri, json!({ "role": "ADMIN" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "ADMIN");

    let response = put_json_auth(app.clone(), &uri, json!({ "role": "SUPERUSER" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    // An admin cannot demote themselves.
    let own = format!("/api/v1/admin/users/{}/role", admin.id);
    let response = put_json_auth(app, &own, json!({ "role": "USER" }), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let unchanged = UserRepo::find_by_id(&pool, admin.id).await.unwrap().unwrap();
    assert_eq!(unchanged.role(), Role::Admin);
}

/// Banning flags the account, lists the email, and ends the user's sessions.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_ban_and_unban_user(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", Role::Admin).await;
    let student = create_user(&pool, "student@example.com", Role::User).await;
    let (app, _outbox) = common::build_test_app(pool.clone());
    let token = login(app.clone(), "admin@example.com").await;

    let body = json!({ "email": "student@example.com", "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/login", body.clone()).await;
    let refresh = cookie_value(&response, REFRESH_COOKIE).unwrap();

    let uri = format!("/api/v1/admin/users/{}/ban", student.id);
    let response = post_json_auth(app.clone(), &uri, json!({ "reason": "  spam  " }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_banned"], true);

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/bans", &token).await).await;
    let bans = json["data"].as_array().unwrap();
    assert_eq!(bans.len(), 1);
    assert_eq!(bans[0]["email"], "student@example.com");
    assert_eq!(bans[0]["reason"], "spam");
    assert_eq!(bans[0]["banned_by"], admin.id);

    let cookie = format!("{REFRESH_COOKIE}={refresh}");
    let response = send(app.clone(), Method::POST, "/api/v1/auth/refresh", None, Auth::Cookie(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(app.clone(), "/api/v1/auth/login", body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_banned"], false);
    assert!(!BannedUserRepo::is_banned(&pool, "student@example.com").await.unwrap());

    // Lifting a ban that is not in place is rejected, as for addresses.
    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_cannot_ban_self(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", Role::Admin).await;
    let (app, _outbox) = common::build_test_app(pool);
    let token = login(app.clone(), "admin@example.com").await;

    let uri = format!("/api/v1/admin/users/{}/ban", admin.id);
    let response = post_json_auth(app.clone(), &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json!({ "email": "Admin@Example.com" });
    let response = post_json_auth(app, "/api/v1/admin/bans", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Addresses can be banned before an account exists, blocking registration.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_ban_list_by_email(pool: PgPool) {
    create_user(&pool, "admin@example.com", Role::Admin).await;
    let existing = create_user(&pool, "existing@example.com", Role::User).await;
    let (app, _outbox) = common::build_test_app(pool.clone());
    let token = login(app.clone(), "admin@example.com").await;

    let body = json!({ "email": "Future@Example.com", "reason": "abuse" });
    let response = post_json_auth(app.clone(), "/api/v1/admin/bans", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let entry = body_json(response).await;
    assert_eq!(entry["data"]["email"], "future@example.com");
    assert_eq!(entry["data"]["reason"], "abuse");

    let body = json!({ "name": "Future", "email": "future@example.com", "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json!({ "email": "existing@example.com" });
    let response = post_json_auth(app.clone(), "/api/v1/admin/bans", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let flagged = UserRepo::find_by_id(&pool, existing.id).await.unwrap().unwrap();
    assert!(flagged.is_banned);

    let response = delete_auth(app.clone(), "/api/v1/admin/bans/existing@example.com", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let restored = UserRepo::find_by_id(&pool, existing.id).await.unwrap().unwrap();
    assert!(!restored.is_banned);

    let response = delete_auth(app.clone(), "/api/v1/admin/bans/nobody@example.com", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "email": "not-an-email" });
    let response = post_json_auth(app, "/api/v1/admin/bans", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
