//! Handlers for reflections (one note per user per lesson) and their export.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use qt_core::error::CoreError;
use qt_core::gamification::REFLECTION_POINTS;
use qt_core::markdown::{escape_html, render_html};
use qt_core::reflection::{detect_direction, validate_content, TextDirection};
use qt_core::types::DbId;
use qt_db::models::reflection::{
    PublicReflection, Reflection, ReflectionWithLesson, UpsertReflection,
};
use qt_db::repositories::{ReflectionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::handlers::lessons::visible_lesson;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /lessons/{id}/reflection`.
#[derive(Debug, Deserialize)]
pub struct SaveReflectionRequest {
    pub content: String,
    /// Detected from the content when omitted.
    pub direction: Option<TextDirection>,
    #[serde(default)]
    pub is_public: bool,
}

/// GET /api/v1/reflections
///
/// The caller's reflections, most recently edited first.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ReflectionWithLesson>>>> {
    let reflections =
        ReflectionRepo::list_for_user(&state.pool, user.user_id, &user.role.satisfied_names())
            .await?;
    Ok(Json(DataResponse { data: reflections }))
}

/// GET /api/v1/lessons/{id}/reflection
///
/// The caller's reflection on a lesson, or `null` when none exists yet.
pub async fn get_reflection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<Reflection>>>> {
    visible_lesson(&state, &user, lesson_id).await?;
    let reflection = ReflectionRepo::find(&state.pool, user.user_id, lesson_id).await?;
    Ok(Json(DataResponse { data: reflection }))
}

/// PUT /api/v1/lessons/{id}/reflection
///
/// Create or replace the caller's reflection. Returns 201 when the row is
/// created and 200 on edits. Points are awarded once per lesson, so a note
/// deleted and written again earns nothing; the streak advances either way.
pub async fn save_reflection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<SaveReflectionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Reflection>>)> {
    validate_content(&input.content)?;
    visible_lesson(&state, &user, lesson_id).await?;

    let direction = input
        .direction
        .unwrap_or_else(|| detect_direction(&input.content));
    let upsert = UpsertReflection {
        content: input.content,
        direction: direction.as_str().to_string(),
        is_public: input.is_public,
    };

    let mut tx = state.pool.begin().await?;
    let (reflection, inserted) =
        ReflectionRepo::upsert(&mut tx, user.user_id, lesson_id, &upsert).await?;
    let mut points = 0;
    if inserted {
        UserRepo::adjust_reflection_count(&mut tx, user.user_id, 1).await?;
        if ReflectionRepo::record_award(&mut tx, user.user_id, lesson_id).await? {
            points = REFLECTION_POINTS;
        }
    }
    UserRepo::record_activity(&mut tx, user.user_id, Utc::now().date_naive(), points).await?;
    tx.commit().await?;

    let status = if inserted {
        tracing::info!(user_id = user.user_id, lesson_id, "Reflection created");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: reflection })))
}

/// DELETE /api/v1/lessons/{id}/reflection
///
/// Points already awarded are kept and not earned again. Returns 204, or 404 when there is nothing to delete.
pub async fn delete_reflection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;
    let deleted = ReflectionRepo::delete(&mut tx, user.user_id, lesson_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Reflection",
            id: lesson_id,
        }));
    }
    UserRepo::adjust_reflection_count(&mut tx, user.user_id, -1).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/lessons/{id}/reflections/public?limit=&offset=
///
/// Other users' public reflections on a lesson.
pub async fn list_public(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PublicReflection>>>> {
    visible_lesson(&state, &user, lesson_id).await?;
    let (limit, offset) = page.clamped();
    let reflections =
        ReflectionRepo::list_public_for_lesson(&state.pool, lesson_id, user.user_id, limit, offset)
            .await?;
    Ok(Json(DataResponse { data: reflections }))
}

/// GET /api/v1/reflections/export
///
/// All of the caller's reflections as a standalone HTML document, in syllabus order.
pub async fn export(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    let roles = user.role.satisfied_names();
    let (owner, reflections) = tokio::try_join!(
        UserRepo::find_by_id(&state.pool, user.user_id),
        ReflectionRepo::list_for_export(&state.pool, user.user_id, &roles),
    )?;
    let owner = owner
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let html = render_export(&owner.name, &reflections);
    Ok((
        [
            (CONTENT_TYPE, "text/html; charset=utf-8"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"reflections.html\"",
            ),
        ],
        html,
    )
        .into_response())
}

/// Render reflections into a printable HTML document.
pub fn render_export(owner_name: &str, reflections: &[ReflectionWithLesson]) -> String {
    let mut body = String::new();
    if reflections.is_empty() {
        body.push_str("<p class=\"empty\">No reflections yet.</p>\n");
    }
    for item in reflections {
        let r = &item.reflection;
        body.push_str("<section class=\"reflection\">\n");
        body.push_str(&format!(
            "<h2>{}</h2>\n<p class=\"meta\">{} &middot; {}</p>\n",
            escape_html(&item.lesson_title),
            escape_html(&item.lesson_part),
            r.updated_at.format("%Y-%m-%d"),
        ));
        if let Some(urdu) = &item.lesson_urdu_title {
            body.push_str(&format!(
                "<p class=\"urdu\" dir=\"rtl\" lang=\"ur\">{}</p>\n",
                escape_html(urdu)
            ));
        }
        let dir = r
            .direction
            .parse::<TextDirection>()
            .unwrap_or_default();
        body.push_str(&format!(
            "<div class=\"content\" dir=\"{dir}\">\n{}</div>\n</section>\n",
            render_html(&r.content)
        ));
    }

    let owner = escape_html(owner_name);
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Reflections of {owner}</title>\n\
         <style>\n\
         body {{ font-family: Georgia, serif; max-width: 46rem; margin: 2rem auto; line-height: 1.6; }}\n\
         .reflection {{ page-break-inside: avoid; border-bottom: 1px solid #ddd; padding-bottom: 1rem; }}\n\
         .meta {{ color: #666; font-size: 0.9rem; }}\n\
         .urdu {{ font-size: 1.2rem; }}\n\
         blockquote {{ border-left: 3px solid #ccc; margin-left: 0; padding-left: 1rem; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <h1>Reflections of {owner}</h1>\n\
         {body}\
         </body>\n\
         </html>\n"
    )
}
