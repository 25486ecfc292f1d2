//! Comment/rating endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::comment::{Comment, CommentWithAuthor, CreateComment},
    AppState,
};

use super::AuthenticatedUser;

/// Comments on a resource, newest first
#[utoipa::path(
    get,
    path = "/resources/{id}/comments",
    tag = "comments",
    params(("id" = i32, Path, description = "Resource ID")),
    responses((status = 200, description = "Comments", body = Vec<CommentWithAuthor>))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(resource_id): Path<i32>,
) -> AppResult<Json<Vec<CommentWithAuthor>>> {
    state.services.repository.resources.get_by_id(resource_id).await?;
    let comments = state
        .services
        .repository
        .comments
        .list_for_resource(resource_id)
        .await?;
    Ok(Json(comments))
}

/// Post a comment as the authenticated reader
#[utoipa::path(
    post,
    path = "/comments",
    tag = "comments",
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    if claims.is_staff() {
        return Err(AppError::Authorization(
            "Only readers can post comments".to_string(),
        ));
    }
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .repository
        .resources
        .get_by_id(request.resource_id)
        .await?;

    let comment = state
        .services
        .repository
        .comments
        .create(claims.id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Delete a comment (moderation)
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "comments",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.repository.comments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
