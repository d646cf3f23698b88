#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use qt_api::auth::cookies::CookieConfig;
use qt_api::auth::jwt::JwtConfig;
use qt_api::auth::oauth::{OAuthConfig, ProviderCredentials};
use qt_api::auth::password::hash_password;
use qt_api::config::ServerConfig;
use qt_api::router::build_app_router;
use qt_api::state::AppState;
use qt_core::roles::Role;
use qt_db::models::lesson::{CreateLesson, Lesson};
use qt_db::models::user::{CreateUser, User};
use qt_db::repositories::{LessonRepo, UserRepo};
use qt_mail::{Mailer, Outbox};

pub const TEST_PASSWORD: &str = "correct horse 42";

/// Build a test `ServerConfig` with safe defaults.
///
/// Email verification is required and only the Google provider is configured.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_base_url: "http://app.test".to_string(),
        static_dir: None,
        require_email_verification: true,
        cookies: CookieConfig { secure: false },
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
        oauth: OAuthConfig {
            google: Some(ProviderCredentials {
                client_id: "google-client".to_string(),
                client_secret: "google-secret".to_string(),
            }),
            github: None,
        },
    }
}

/// Build the full application router with the production middleware stack,
/// plus the outbox capturing every email it sends.
pub fn build_test_app(pool: PgPool) -> (Router, Outbox) {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> (Router, Outbox) {
    let (mailer, outbox) = Mailer::in_memory();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer: Arc::new(mailer),
        http: reqwest::Client::new(),
    };
    (build_app_router(state, &config), outbox)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Credentials attached to a test request.
#[derive(Clone, Copy)]
pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    Cookie(&'a str),
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    auth: Auth<'_>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    builder = match auth {
        Auth::None => builder,
        Auth::Bearer(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        Auth::Cookie(cookie) => builder.header(COOKIE, cookie),
    };
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, Auth::None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, None, Auth::Bearer(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body), Auth::None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(body), Auth::Bearer(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(body), Auth::Bearer(token)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PATCH, uri, Some(body), Auth::Bearer(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, None, Auth::Bearer(token)).await
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Full `Set-Cookie` header for `name`, if the response sets it.
pub fn set_cookie_header(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// Value of the cookie `name` set by the response.
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookie_header(response, name).map(|header| {
        let pair = header.split(';').next().unwrap_or_default();
        pair[name.len() + 1..].to_string()
    })
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .expect("response should redirect")
        .to_str()
        .unwrap()
        .to_string()
}

/// Token from the most recent emailed link sent to `email`.
pub fn token_from_mail(outbox: &Outbox, email: &str) -> String {
    let mail = outbox.last_to(email).expect("an email should have been sent");
    let start = mail.body.find("token=").expect("email should contain a link") + "token=".len();
    mail.body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status for response");
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a verified credentials user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, role: Role) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
            image: None,
            email_verified: true,
        },
    )
    .await
    .expect("user creation should succeed");

    if role == Role::User {
        return user;
    }
    let mut conn = pool.acquire().await.unwrap();
    UserRepo::set_role(&mut conn, user.id, role.as_str())
        .await
        .unwrap()
        .unwrap()
}

pub async fn create_lesson(pool: &PgPool, title: &str, part: &str, min_role: Role) -> Lesson {
    LessonRepo::create(
        pool,
        &CreateLesson {
            title: title.to_string(),
            part: part.to_string(),
            urdu_title: None,
            description: format!("About {title}"),
            reference: None,
            presentation_url: None,
            min_role: Some(min_role),
            sort_order: None,
        },
    )
    .await
    .expect("lesson creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["data"]["access_token"].as_str().unwrap().to_string()
}
