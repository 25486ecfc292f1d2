//! Staff management endpoints (administration privilege)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::staff::{privileges, CreateStaff, Staff, StaffType, StaffTypePayload},
    AppState,
};

use super::AuthenticatedUser;

/// List all staff members
#[utoipa::path(
    get,
    path = "/staff",
    tag = "staff",
    responses((status = 200, description = "Staff list", body = Vec<Staff>))
)]
pub async fn list_staff(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Staff>>> {
    claims.require(privileges::ADMINISTRATION)?;

    let staff = state.services.repository.staff.list().await?;
    Ok(Json(staff))
}

/// Get one staff member
#[utoipa::path(
    get,
    path = "/staff/{id}",
    tag = "staff",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member found", body = Staff),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn get_staff(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Staff>> {
    claims.require(privileges::ADMINISTRATION)?;

    let staff = state.services.repository.staff.get_by_id(id).await?;
    Ok(Json(staff))
}

/// Create a staff member
#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff member created", body = Staff),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_staff(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateStaff>,
) -> AppResult<(StatusCode, Json<Staff>)> {
    claims.require(privileges::ADMINISTRATION)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = state.services.auth.hash_password(&request.password)?;
    let staff = state
        .services
        .repository
        .staff
        .create(&request, &password_hash)
        .await?;

    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("created staff account {}", staff.email))
        .await?;

    Ok((StatusCode::CREATED, Json(staff)))
}

/// Delete a staff member
#[utoipa::path(
    delete,
    path = "/staff/{id}",
    tag = "staff",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 204, description = "Staff member deleted"),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn delete_staff(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(privileges::ADMINISTRATION)?;

    if claims.id == id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    state.services.repository.staff.delete(id).await?;
    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("deleted staff account {}", id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// --- staff types ---

/// List staff types and their privilege lists
#[utoipa::path(
    get,
    path = "/staff-types",
    tag = "staff",
    responses((status = 200, description = "Staff types", body = Vec<StaffType>))
)]
pub async fn list_staff_types(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<StaffType>>> {
    claims.require(privileges::ADMINISTRATION)?;

    let types = state.services.repository.staff.list_types().await?;
    Ok(Json(types))
}

/// Create a staff type
#[utoipa::path(
    post,
    path = "/staff-types",
    tag = "staff",
    request_body = StaffTypePayload,
    responses((status = 201, description = "Staff type created", body = StaffType))
)]
pub async fn create_staff_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<StaffTypePayload>,
) -> AppResult<(StatusCode, Json<StaffType>)> {
    claims.require(privileges::ADMINISTRATION)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let staff_type = state.services.repository.staff.create_type(&request).await?;
    Ok((StatusCode::CREATED, Json(staff_type)))
}

/// Update a staff type
#[utoipa::path(
    put,
    path = "/staff-types/{id}",
    tag = "staff",
    params(("id" = i32, Path, description = "Staff type ID")),
    request_body = StaffTypePayload,
    responses(
        (status = 200, description = "Staff type updated", body = StaffType),
        (status = 404, description = "Staff type not found")
    )
)]
pub async fn update_staff_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<StaffTypePayload>,
) -> AppResult<Json<StaffType>> {
    claims.require(privileges::ADMINISTRATION)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let staff_type = state
        .services
        .repository
        .staff
        .update_type(id, &request)
        .await?;
    Ok(Json(staff_type))
}

/// Delete a staff type
#[utoipa::path(
    delete,
    path = "/staff-types/{id}",
    tag = "staff",
    params(("id" = i32, Path, description = "Staff type ID")),
    responses(
        (status = 204, description = "Staff type deleted"),
        (status = 404, description = "Staff type not found")
    )
)]
pub async fn delete_staff_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(privileges::ADMINISTRATION)?;

    state.services.repository.staff.delete_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
