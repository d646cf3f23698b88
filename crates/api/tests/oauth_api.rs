//! Integration tests for the OAuth redirect/callback endpoints and for
//! linking provider identities to local accounts.
//!
//! Provider calls are not exercised; callback tests stop before the code
//! exchange.

mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{cookie_value, create_user, get, location, send, Auth};
use qt_api::auth::cookies::{OAUTH_STATE_COOKIE, SESSION_COOKIE};
use qt_api::auth::oauth::{OAuthProfile, OAuthProvider};
use qt_api::error::AppError;
use qt_api::handlers::oauth::resolve_oauth_user;
use qt_core::error::CoreError;
use qt_core::roles::Role;
use qt_db::repositories::{BannedUserRepo, OAuthAccountRepo, UserRepo};
use reqwest::Url;
use sqlx::PgPool;

fn google_profile(id: &str, email: &str, verified: bool) -> OAuthProfile {
    OAuthProfile {
        provider: OAuthProvider::Google,
        provider_account_id: id.to_string(),
        email: email.to_string(),
        email_verified: verified,
        name: Some("Maryam Q".to_string()),
        image: Some("https://lh3.example.com/photo.jpg".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Redirects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_start_redirects_to_provider_with_state(pool: PgPool) {
    let (app, _outbox) = common::build_test_app(pool);

    let response = get(app, "/api/v1/auth/oauth/google").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let url = Url::parse(&location(&response)).unwrap();
    assert_eq!(url.host_str(), Some("accounts.google.com"));
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };
    assert_eq!(param("client_id").as_deref(), Some("google-client"));
    assert_eq!(param("response_type").as_deref(), Some("code"));
    assert_eq!(
        param("redirect_uri").as_deref(),
        Some("http://app.test/api/v1/auth/oauth/google/callback")
    );

    let state = param("state").expect("state parameter");
    let cookie = cookie_value(&response, OAUTH_STATE_COOKIE).expect("state cookie");
    assert_eq!(cookie, format!("google:{state}"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_start_rejects_unknown_or_unconfigured_provider(pool: PgPool) {
    let (app, _outbox) = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/auth/oauth/myspace").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // GitHub has no credentials in the test configuration.
    let response = get(app, "/api/v1/auth/oauth/github").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_callback_rejects_missing_or_mismatched_state(pool: PgPool) {
    let (app, _outbox) = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/auth/oauth/google/callback?code=abc&state=xyz").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error=oauth_state");
    assert!(cookie_value(&response, SESSION_COOKIE).is_none());

    let cookie = format!("{OAUTH_STATE_COOKIE}=google:expected");
    let response = send(
        app.clone(),
        Method::GET,
        "/api/v1/auth/oauth/google/callback?code=abc&state=forged",
        None,
        Auth::Cookie(&cookie),
    )
    .await;
    assert_eq!(location(&response), "/login?error=oauth_state");

    // A state issued for another provider does not validate.
    let cookie = format!("{OAUTH_STATE_COOKIE}=github:expected");
    let response = send(
        app,
        Method::GET,
        "/api/v1/auth/oauth/google/callback?code=abc&state=expected",
        None,
        Auth::Cookie(&cookie),
    )
    .await;
    assert_eq!(location(&response), "/login?error=oauth_state");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_callback_reports_denied_consent(pool: PgPool) {
    let (app, _outbox) = common::build_test_app(pool);

    let cookie = format!("{OAUTH_STATE_COOKIE}=google:expected");
    let response = send(
        app.clone(),
        Method::GET,
        "/api/v1/auth/oauth/google/callback?error=access_denied&state=expected",
        None,
        Auth::Cookie(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error=oauth_denied");

    let response = get(app, "/api/v1/auth/oauth/myspace/callback?code=abc&state=x").await;
    assert_eq!(location(&response), "/login?error=oauth_failed");
}

// ---------------------------------------------------------------------------
// Account resolution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_creates_then_reuses_user(pool: PgPool) {
    let profile = google_profile("g-1", "maryam@example.com", true);

    let created = resolve_oauth_user(&pool, &profile).await.unwrap();
    assert_eq!(created.email, "maryam@example.com");
    assert_eq!(created.name, "Maryam Q");
    assert!(created.password_hash.is_none());
    assert!(created.is_verified());
    assert_eq!(created.image.as_deref(), Some("https://lh3.example.com/photo.jpg"));

    let again = resolve_oauth_user(&pool, &profile).await.unwrap();
    assert_eq!(again.id, created.id);

    let links = OAuthAccountRepo::list_for_user(&pool, created.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].provider, "google");
}

/// A verified provider email links to the existing credentials account.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_links_existing_account(pool: PgPool) {
    let existing = create_user(&pool, "amina@example.com", Role::User).await;

    let user = resolve_oauth_user(&pool, &google_profile("g-2", "amina@example.com", true))
        .await
        .unwrap();
    assert_eq!(user.id, existing.id);
    assert!(user.password_hash.is_some());

    let links = OAuthAccountRepo::list_for_user(&pool, existing.id).await.unwrap();
    assert_eq!(links.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_refuses_unverified_email_match(pool: PgPool) {
    create_user(&pool, "amina@example.com", Role::User).await;

    let result = resolve_oauth_user(&pool, &google_profile("g-3", "amina@example.com", false)).await;
    assert_matches!(result, Err(AppError::Core(CoreError::Conflict(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_rejects_banned(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", Role::Admin).await;
    BannedUserRepo::ban(&mut pool.acquire().await.unwrap(), "spam@example.com", None, admin.id)
        .await
        .unwrap();

    let result = resolve_oauth_user(&pool, &google_profile("g-4", "spam@example.com", true)).await;
    assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
    assert!(UserRepo::find_by_email(&pool, "spam@example.com").await.unwrap().is_none());

    // A flagged account is rejected even when its address is not listed.
    let user = resolve_oauth_user(&pool, &google_profile("g-5", "later@example.com", true))
        .await
        .unwrap();
    UserRepo::set_banned(&mut pool.acquire().await.unwrap(), user.id, true)
        .await
        .unwrap();
    let result = resolve_oauth_user(&pool, &google_profile("g-5", "later@example.com", true)).await;
    assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
}
