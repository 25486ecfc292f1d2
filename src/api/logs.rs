//! Audit trail endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{audit::AuditLog, staff::privileges},
    AppState,
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct LogQuery {
    /// Maximum number of entries to return (default 200)
    pub limit: Option<i64>,
}

/// Recent staff actions, newest first
#[utoipa::path(
    get,
    path = "/logs",
    tag = "logs",
    params(LogQuery),
    responses((status = 200, description = "Audit log entries", body = Vec<AuditLog>))
)]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<Vec<AuditLog>>> {
    claims.require(privileges::VIEW_LOGS)?;

    let limit = query.limit.unwrap_or(200).clamp(1, 1000);
    let logs = state.services.repository.audit.list(limit).await?;
    Ok(Json(logs))
}
