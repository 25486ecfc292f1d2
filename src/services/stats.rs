//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::resource::MostBorrowedResource,
    repository::Repository,
};

/// Dashboard totals
#[derive(Debug, Serialize, ToSchema)]
pub struct Stats {
    pub total_users: i64,
    pub total_resources: i64,
    pub total_reservations: i64,
    pub monthly_borrows: i64,
}

/// Borrow count for one calendar month
#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyBorrows {
    pub month: &'static str,
    pub borrows: i64,
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Dashboard totals
    pub async fn get_stats(&self) -> AppResult<Stats> {
        Ok(Stats {
            total_users: self.repository.users.count().await?,
            total_resources: self.repository.resources.count().await?,
            total_reservations: self.repository.reservations.count_total().await?,
            monthly_borrows: self.repository.reservations.count_current_month().await?,
        })
    }

    /// Borrow counts for all twelve months, zero-filled
    pub async fn monthly_borrows(&self) -> AppResult<Vec<MonthlyBorrows>> {
        let counts = self.repository.reservations.monthly_borrow_counts().await?;

        let mut by_month = [0i64; 12];
        for (month, count) in counts {
            if (1..=12).contains(&month) {
                by_month[(month - 1) as usize] = count;
            }
        }

        Ok(MONTH_NAMES
            .iter()
            .zip(by_month)
            .map(|(month, borrows)| MonthlyBorrows { month, borrows })
            .collect())
    }

    /// Most borrowed resources
    pub async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<MostBorrowedResource>> {
        self.repository.resources.most_borrowed(limit).await
    }
}
