//! Dashboard statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::resource::MostBorrowedResource,
    services::stats::{MonthlyBorrows, Stats},
    AppState,
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct MostBorrowedQuery {
    /// Number of resources to return (default 10)
    pub limit: Option<i64>,
}

/// Dashboard totals
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses((status = 200, description = "Dashboard totals", body = Stats))
)]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Stats>> {
    claims.require_staff()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}

/// Borrow counts per calendar month, zero-filled for empty months
#[utoipa::path(
    get,
    path = "/stats/monthly",
    tag = "stats",
    responses((status = 200, description = "Monthly borrow counts", body = Vec<MonthlyBorrows>))
)]
pub async fn monthly_borrows(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<MonthlyBorrows>>> {
    claims.require_staff()?;

    let months = state.services.stats.monthly_borrows().await?;
    Ok(Json(months))
}

/// Most borrowed resources by lifetime counter
#[utoipa::path(
    get,
    path = "/stats/most-borrowed",
    tag = "stats",
    params(MostBorrowedQuery),
    responses((status = 200, description = "Most borrowed resources", body = Vec<MostBorrowedResource>))
)]
pub async fn most_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MostBorrowedQuery>,
) -> AppResult<Json<Vec<MostBorrowedResource>>> {
    claims.require_staff()?;

    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let resources = state.services.stats.most_borrowed(limit).await?;
    Ok(Json(resources))
}
