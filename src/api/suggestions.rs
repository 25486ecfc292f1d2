//! Acquisition suggestion endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::suggestion::{CreateSuggestion, Suggestion},
    AppState,
};

use super::AuthenticatedUser;

/// List all suggestions, newest first
#[utoipa::path(
    get,
    path = "/suggestions",
    tag = "suggestions",
    responses((status = 200, description = "Suggestions", body = Vec<Suggestion>))
)]
pub async fn list_suggestions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Suggestion>>> {
    claims.require_staff()?;

    let suggestions = state.services.repository.suggestions.list().await?;
    Ok(Json(suggestions))
}

/// Submit a suggestion
#[utoipa::path(
    post,
    path = "/suggestions",
    tag = "suggestions",
    request_body = CreateSuggestion,
    responses((status = 201, description = "Suggestion created", body = Suggestion))
)]
pub async fn create_suggestion(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateSuggestion>,
) -> AppResult<(StatusCode, Json<Suggestion>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = if claims.is_staff() { None } else { Some(claims.id) };
    let suggestion = state
        .services
        .repository
        .suggestions
        .create(user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(suggestion)))
}

/// Delete a suggestion once it has been handled
#[utoipa::path(
    delete,
    path = "/suggestions/{id}",
    tag = "suggestions",
    params(("id" = i32, Path, description = "Suggestion ID")),
    responses(
        (status = 204, description = "Suggestion deleted"),
        (status = 404, description = "Suggestion not found")
    )
)]
pub async fn delete_suggestion(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.repository.suggestions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
