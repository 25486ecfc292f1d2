//! Reader management endpoints (staff-facing)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        staff::privileges,
        user::{CreateUser, UpdateUser, User, UserQuery, UserType, UserTypePayload, UserWithType},
    },
    AppState,
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List readers, optionally filtered by account status
#[utoipa::path(
    get,
    path = "/readers",
    tag = "readers",
    params(UserQuery),
    responses((status = 200, description = "Readers list", body = Vec<UserWithType>))
)]
pub async fn list_readers(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserWithType>>> {
    claims.require_staff()?;

    let readers = state.services.repository.users.list(query.status).await?;
    Ok(Json(readers))
}

/// Get one reader
#[utoipa::path(
    get,
    path = "/readers/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 200, description = "Reader found", body = User),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn get_reader(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_staff()?;

    let reader = state.services.repository.users.get_by_id(id).await?;
    Ok(Json(reader))
}

/// Create a reader (staff-created accounts start verified)
#[utoipa::path(
    post,
    path = "/readers",
    tag = "readers",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Reader created", body = User),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_reader(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require(privileges::MANAGE_READERS)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = match &request.password {
        Some(password) => Some(state.services.auth.hash_password(password)?),
        None => None,
    };
    let reader = state
        .services
        .repository
        .users
        .create(&request, password_hash)
        .await?;
    state
        .services
        .repository
        .users
        .update_status(reader.id, 1)
        .await?;

    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("created reader {}", reader.email))
        .await?;

    Ok((StatusCode::CREATED, Json(reader)))
}

/// Update a reader
#[utoipa::path(
    put,
    path = "/readers/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "Reader ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Reader updated", body = User),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn update_reader(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    claims.require(privileges::MANAGE_READERS)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let reader = state.services.repository.users.update(id, &request).await?;
    Ok(Json(reader))
}

/// Approve or reject a pending signup.
///
/// Approving flips the account to verified; rejecting deletes it.
#[utoipa::path(
    put,
    path = "/readers/{id}/status",
    tag = "readers",
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn verify_reader(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    claims.require(privileges::MANAGE_READERS)?;

    state.services.repository.users.update_status(id, 1).await?;
    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("verified reader {}", id))
        .await?;

    Ok(Json(MessageResponse {
        message: "Reader verified".to_string(),
    }))
}

/// Delete a reader
#[utoipa::path(
    delete,
    path = "/readers/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 204, description = "Reader deleted"),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn delete_reader(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(privileges::MANAGE_READERS)?;

    state.services.repository.users.delete(id).await?;
    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("deleted reader {}", id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// --- user types ---

/// List user types with their circulation windows
#[utoipa::path(
    get,
    path = "/user-types",
    tag = "readers",
    responses((status = 200, description = "User types", body = Vec<UserType>))
)]
pub async fn list_user_types(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<UserType>>> {
    claims.require_staff()?;

    let types = state.services.repository.users.list_types().await?;
    Ok(Json(types))
}

/// Create a user type
#[utoipa::path(
    post,
    path = "/user-types",
    tag = "readers",
    request_body = UserTypePayload,
    responses((status = 201, description = "User type created", body = UserType))
)]
pub async fn create_user_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UserTypePayload>,
) -> AppResult<(StatusCode, Json<UserType>)> {
    claims.require(privileges::ADMINISTRATION)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_type = state.services.repository.users.create_type(&request).await?;
    Ok((StatusCode::CREATED, Json(user_type)))
}

/// Update a user type
#[utoipa::path(
    put,
    path = "/user-types/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "User type ID")),
    request_body = UserTypePayload,
    responses(
        (status = 200, description = "User type updated", body = UserType),
        (status = 404, description = "User type not found")
    )
)]
pub async fn update_user_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UserTypePayload>,
) -> AppResult<Json<UserType>> {
    claims.require(privileges::ADMINISTRATION)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_type = state
        .services
        .repository
        .users
        .update_type(id, &request)
        .await?;
    Ok(Json(user_type))
}

/// Delete a user type
#[utoipa::path(
    delete,
    path = "/user-types/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "User type ID")),
    responses(
        (status = 204, description = "User type deleted"),
        (status = 404, description = "User type not found")
    )
)]
pub async fn delete_user_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(privileges::ADMINISTRATION)?;

    state.services.repository.users.delete_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
