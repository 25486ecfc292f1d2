//! Loan lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        reservation::{CreateReservation, LoanView, Reservation, ReservationState, TransactionView},
        staff::privileges,
    },
    services::email::LateNotice,
    AppState,
};

use super::AuthenticatedUser;

/// Create loan request
#[derive(Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Borrowing reader
    pub user_id: i32,
    /// Borrowed resource
    pub resource_id: i32,
    /// Requested transaction type, defaults to Borrow
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

/// Transition request
#[derive(Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target transaction type (Return, Renew, Renew2, Late)
    #[serde(rename = "type")]
    pub transaction_type: String,
}

/// Loan response
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub reservation: Reservation,
    pub message: String,
}

/// Late-sweep response
#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    pub updated_count: u64,
}

/// Late-notice request: which reservations to email about
#[derive(Deserialize, ToSchema)]
pub struct LateNoticeRequest {
    pub reservation_ids: Vec<i32>,
}

/// List all transactions with borrower names and titles
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "loans",
    responses((status = 200, description = "All transactions", body = Vec<TransactionView>))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<TransactionView>>> {
    claims.require_staff()?;

    let transactions = state.services.circulation.list_transactions().await?;
    Ok(Json(transactions))
}

/// Create a new loan
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 404, description = "User or resource not found"),
        (status = 409, description = "Resource not available"),
        (status = 422, description = "Borrow limit exceeded")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    claims.require(privileges::CIRCULATION)?;

    let requested_state = match request.transaction_type.as_deref() {
        Some(label) => label.parse::<ReservationState>()?,
        None => ReservationState::Borrow,
    };

    let reservation = state
        .services
        .circulation
        .create_loan(CreateReservation {
            user_id: request.user_id,
            resource_id: request.resource_id,
            staff_id: Some(claims.id),
            state: requested_state,
        })
        .await?;

    state
        .services
        .repository
        .audit
        .add(
            &claims.sub,
            &format!(
                "created loan {} for user {} on resource {}",
                reservation.id, request.user_id, request.resource_id
            ),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            reservation,
            message: "Reservation created successfully".to_string(),
        }),
    ))
}

/// Apply a lifecycle transition (renew, return, late)
#[utoipa::path(
    put,
    path = "/transactions/{id}",
    tag = "loans",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = LoanResponse),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Transition not allowed")
    )
)]
pub async fn transition_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reservation_id): Path<i32>,
    Json(request): Json<TransitionRequest>,
) -> AppResult<Json<LoanResponse>> {
    claims.require(privileges::CIRCULATION)?;

    let new_state = request.transaction_type.parse::<ReservationState>()?;
    let reservation = state
        .services
        .circulation
        .transition_loan(reservation_id, new_state)
        .await?;

    Ok(Json(LoanResponse {
        message: format!("Reservation moved to {}", new_state.label()),
        reservation,
    }))
}

/// Delete a reservation outright
#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    tag = "loans",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn delete_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reservation_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(privileges::CIRCULATION)?;

    state.services.circulation.delete_loan(reservation_id).await?;
    state
        .services
        .repository
        .audit
        .add(&claims.sub, &format!("deleted reservation {}", reservation_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List currently late loans
#[utoipa::path(
    get,
    path = "/late",
    tag = "loans",
    responses((status = 200, description = "Late loans", body = Vec<TransactionView>))
)]
pub async fn list_late(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<TransactionView>>> {
    claims.require_staff()?;

    let late = state.services.circulation.list_late().await?;
    Ok(Json(late))
}

/// Sweep active loans past their due date into Late
#[utoipa::path(
    post,
    path = "/late/sweep",
    tag = "loans",
    responses((status = 200, description = "Sweep completed", body = SweepResponse))
)]
pub async fn sweep_late(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SweepResponse>> {
    claims.require(privileges::CIRCULATION)?;

    let updated_count = state.services.circulation.sweep_late().await?;
    Ok(Json(SweepResponse { updated_count }))
}

/// Email overdue notices to the borrowers of the given reservations
#[utoipa::path(
    post,
    path = "/late/notices",
    tag = "loans",
    request_body = LateNoticeRequest,
    responses(
        (status = 200, description = "Notices sent", body = crate::services::email::NoticeSummary),
        (status = 400, description = "No reservations selected")
    )
)]
pub async fn send_late_notices(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<LateNoticeRequest>,
) -> AppResult<Json<crate::services::email::NoticeSummary>> {
    claims.require(privileges::CIRCULATION)?;

    if request.reservation_ids.is_empty() {
        return Err(AppError::BadRequest("No reservations selected".to_string()));
    }

    let now = Utc::now();
    let mut notices = Vec::new();
    for reservation_id in &request.reservation_ids {
        let reservation = match state
            .services
            .repository
            .reservations
            .get_by_id(*reservation_id)
            .await
        {
            Ok(reservation) => reservation,
            Err(AppError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };

        let user = state
            .services
            .repository
            .users
            .get_by_id(reservation.user_id)
            .await?;
        let resource = state
            .services
            .repository
            .resources
            .get_by_id(reservation.resource_id)
            .await?;

        // A Late row carries no forward-looking due date; recover the one it
        // blew through from the last active state in the history log.
        let policy = state
            .services
            .circulation
            .policy_for(reservation.user_id, reservation.resource_id)
            .await?;
        let records = state
            .services
            .repository
            .reservations
            .history_for_reservation(*reservation_id)
            .await?;
        let due = records
            .iter()
            .rev()
            .find_map(|record| policy.due_date(record.state, record.date))
            .unwrap_or(reservation.state_date);
        let days_late = (now - due).num_days().max(0);
        if days_late == 0 {
            continue;
        }

        notices.push(LateNotice {
            email: user.email,
            name: user.name.unwrap_or_else(|| "Reader".to_string()),
            title: resource.title,
            due_date: due.format("%Y-%m-%d").to_string(),
            days_late,
        });
    }

    if notices.is_empty() {
        return Err(AppError::BadRequest("No valid recipients found".to_string()));
    }

    let summary = state.services.email.send_late_notices(&notices).await;
    state
        .services
        .repository
        .audit
        .add(
            &claims.sub,
            &format!("sent late return notices to {} users", summary.sent.len()),
        )
        .await?;

    Ok(Json(summary))
}

/// Borrowing history for a reader
#[utoipa::path(
    get,
    path = "/users/{id}/history",
    tag = "loans",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's loan history", body = Vec<LoanView>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<LoanView>>> {
    // Readers may read their own history; staff need a session at all
    if !claims.is_staff() && claims.id != user_id {
        return Err(AppError::Authorization(
            "Cannot read another reader's history".to_string(),
        ));
    }

    let history = state.services.history.project_for_user(user_id).await?;
    Ok(Json(history))
}

/// Borrowing history for a resource
#[utoipa::path(
    get,
    path = "/resources/{id}/history",
    tag = "loans",
    params(("id" = i32, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource's loan history", body = Vec<LoanView>),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(resource_id): Path<i32>,
) -> AppResult<Json<Vec<LoanView>>> {
    claims.require_staff()?;

    let history = state
        .services
        .history
        .project_for_resource(resource_id)
        .await?;
    Ok(Json(history))
}
