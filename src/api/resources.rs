//! Catalog (resources) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        resource::{
            CreateResource, Resource, ResourceType, ResourceTypePayload, ResourceWithType,
            UpdateResource,
        },
        staff::privileges,
    },
    AppState,
};

use super::AuthenticatedUser;

/// List the catalog with type names
#[utoipa::path(
    get,
    path = "/resources",
    tag = "resources",
    responses((status = 200, description = "Catalog list", body = Vec<ResourceWithType>))
)]
pub async fn list_resources(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ResourceWithType>>> {
    let resources = state.services.repository.resources.list().await?;
    Ok(Json(resources))
}

/// Get one resource
#[utoipa::path(
    get,
    path = "/resources/{id}",
    tag = "resources",
    params(("id" = i32, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource found", body = Resource),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Resource>> {
    let resource = state.services.repository.resources.get_by_id(id).await?;
    Ok(Json(resource))
}

/// Create a resource; it enters the catalog available for borrowing
#[utoipa::path(
    post,
    path = "/resources",
    tag = "resources",
    request_body = CreateResource,
    responses((status = 201, description = "Resource created", body = Resource))
)]
pub async fn create_resource(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    claims.require(privileges::MANAGE_RESOURCES)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let resource = state.services.repository.resources.create(&request).await?;
    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("added resource '{}'", resource.title))
        .await?;

    Ok((StatusCode::CREATED, Json(resource)))
}

/// Update a resource's catalog fields.
///
/// Availability and the borrow counter are owned by the circulation
/// lifecycle and cannot be set here.
#[utoipa::path(
    put,
    path = "/resources/{id}",
    tag = "resources",
    params(("id" = i32, Path, description = "Resource ID")),
    request_body = UpdateResource,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn update_resource(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateResource>,
) -> AppResult<Json<Resource>> {
    claims.require(privileges::MANAGE_RESOURCES)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let resource = state
        .services
        .repository
        .resources
        .update(id, &request)
        .await?;
    Ok(Json(resource))
}

/// Delete a resource
#[utoipa::path(
    delete,
    path = "/resources/{id}",
    tag = "resources",
    params(("id" = i32, Path, description = "Resource ID")),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn delete_resource(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(privileges::MANAGE_RESOURCES)?;

    state.services.repository.resources.delete(id).await?;
    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("deleted resource {}", id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// --- resource types ---

/// List resource types with their borrow-window overrides
#[utoipa::path(
    get,
    path = "/resource-types",
    tag = "resources",
    responses((status = 200, description = "Resource types", body = Vec<ResourceType>))
)]
pub async fn list_resource_types(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ResourceType>>> {
    claims.require_staff()?;

    let types = state.services.repository.resources.list_types().await?;
    Ok(Json(types))
}

/// Create a resource type
#[utoipa::path(
    post,
    path = "/resource-types",
    tag = "resources",
    request_body = ResourceTypePayload,
    responses((status = 201, description = "Resource type created", body = ResourceType))
)]
pub async fn create_resource_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ResourceTypePayload>,
) -> AppResult<(StatusCode, Json<ResourceType>)> {
    claims.require(privileges::ADMINISTRATION)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let resource_type = state
        .services
        .repository
        .resources
        .create_type(&request)
        .await?;
    Ok((StatusCode::CREATED, Json(resource_type)))
}

/// Update a resource type
#[utoipa::path(
    put,
    path = "/resource-types/{id}",
    tag = "resources",
    params(("id" = i32, Path, description = "Resource type ID")),
    request_body = ResourceTypePayload,
    responses(
        (status = 200, description = "Resource type updated", body = ResourceType),
        (status = 404, description = "Resource type not found")
    )
)]
pub async fn update_resource_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ResourceTypePayload>,
) -> AppResult<Json<ResourceType>> {
    claims.require(privileges::ADMINISTRATION)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let resource_type = state
        .services
        .repository
        .resources
        .update_type(id, &request)
        .await?;
    Ok(Json(resource_type))
}

/// Delete a resource type
#[utoipa::path(
    delete,
    path = "/resource-types/{id}",
    tag = "resources",
    params(("id" = i32, Path, description = "Resource type ID")),
    responses(
        (status = 204, description = "Resource type deleted"),
        (status = 404, description = "Resource type not found")
    )
)]
pub async fn delete_resource_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(privileges::ADMINISTRATION)?;

    state.services.repository.resources.delete_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
