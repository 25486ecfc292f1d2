//! History projector
//!
//! Rebuilds denormalized per-loan views from the append-only history log.
//! Records are grouped by reservation id, folded chronologically into one
//! `LoanView` per loan, and sorted most-recent-first.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::{
    error::AppResult,
    models::reservation::{HistoryEntryRow, LoanPolicy, LoanView, ReservationState},
    repository::Repository,
};

#[derive(Clone)]
pub struct HistoryService {
    repository: Repository,
}

impl HistoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Per-user borrowing history, labeled with resource titles
    pub async fn project_for_user(&self, user_id: i32) -> AppResult<Vec<LoanView>> {
        // Verify the user exists so an unknown id is a 404, not an empty list
        self.repository.users.get_by_id(user_id).await?;
        let rows = self.repository.reservations.history_for_user(user_id).await?;
        Ok(project(rows))
    }

    /// Per-resource borrowing history, labeled with borrower names
    pub async fn project_for_resource(&self, resource_id: i32) -> AppResult<Vec<LoanView>> {
        self.repository.resources.get_by_id(resource_id).await?;
        let rows = self
            .repository
            .reservations
            .history_for_resource(resource_id)
            .await?;
        Ok(project(rows))
    }
}

/// Fold raw history rows into one `LoanView` per reservation.
///
/// Rows must arrive oldest first (the repository orders by date). Borrow
/// and renewal records set the borrow date and recompute the due date from
/// the record's own date; Return sets the return date; Late only marks the
/// status. The projections are sorted by their most meaningful date,
/// descending.
pub fn project(rows: Vec<HistoryEntryRow>) -> Vec<LoanView> {
    let mut grouped: BTreeMap<i32, Vec<HistoryEntryRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.reservation_id).or_default().push(row);
    }

    let mut views: Vec<LoanView> = grouped.into_values().map(fold_loan).collect();
    views.sort_by_key(|v| std::cmp::Reverse(sort_date(v)));
    views
}

fn fold_loan(records: Vec<HistoryEntryRow>) -> LoanView {
    let mut view = LoanView {
        label: String::new(),
        reservation_date: None,
        borrow_date: None,
        due_date: None,
        return_date: None,
        status: String::new(),
    };

    for record in records {
        let policy = LoanPolicy::resolve(
            record.user_borrow_window,
            record.user_renew_window,
            record.resource_borrow_window,
        );
        view.label = record.label;
        view.status = record.state.label().to_string();

        match record.state {
            ReservationState::Borrow
            | ReservationState::RenewOne
            | ReservationState::RenewTwo => {
                if view.reservation_date.is_none() {
                    view.reservation_date = Some(record.date);
                }
                view.borrow_date = Some(record.date);
                view.due_date = policy.due_date(record.state, record.date);
            }
            ReservationState::Return => {
                view.return_date = Some(record.date);
            }
            ReservationState::Late => {
                // Status only; the due date stays the one computed from the
                // last active state.
            }
        }
    }

    view
}

fn sort_date(view: &LoanView) -> Option<DateTime<Utc>> {
    view.borrow_date.or(view.reservation_date).or(view.return_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn entry(
        reservation_id: i32,
        state: ReservationState,
        date: DateTime<Utc>,
    ) -> HistoryEntryRow {
        HistoryEntryRow {
            reservation_id,
            state,
            date,
            label: format!("loan-{}", reservation_id),
            user_borrow_window: Some(14),
            user_renew_window: Some(7),
            resource_borrow_window: None,
        }
    }

    #[test]
    fn borrow_then_return_produces_a_completed_view() {
        let views = project(vec![
            entry(1, ReservationState::Borrow, day(0)),
            entry(1, ReservationState::Return, day(9)),
        ]);

        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.borrow_date, Some(day(0)));
        assert_eq!(view.due_date, Some(day(14)));
        assert_eq!(view.return_date, Some(day(9)));
        assert_eq!(view.status, "Return");
    }

    #[test]
    fn renewal_recomputes_due_date_from_the_renewal_date() {
        let views = project(vec![
            entry(1, ReservationState::Borrow, day(0)),
            entry(1, ReservationState::RenewOne, day(10)),
        ]);

        let view = &views[0];
        assert_eq!(view.borrow_date, Some(day(10)));
        // 10 + 14 + 7
        assert_eq!(view.due_date, Some(day(31)));
        assert_eq!(view.status, "Renew");
    }

    #[test]
    fn late_sets_status_without_touching_the_due_date() {
        let views = project(vec![
            entry(1, ReservationState::Borrow, day(0)),
            entry(1, ReservationState::Late, day(20)),
        ]);

        let view = &views[0];
        assert_eq!(view.status, "Late");
        assert_eq!(view.due_date, Some(day(14)));
        assert_eq!(view.borrow_date, Some(day(0)));
        assert!(view.return_date.is_none());
    }

    #[test]
    fn loans_sort_most_recent_first() {
        let views = project(vec![
            entry(1, ReservationState::Borrow, day(0)),
            entry(1, ReservationState::Return, day(5)),
            entry(2, ReservationState::Borrow, day(30)),
            entry(3, ReservationState::Borrow, day(15)),
        ]);

        let labels: Vec<&str> = views.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["loan-2", "loan-3", "loan-1"]);
    }

    #[test]
    fn separate_reservations_do_not_merge() {
        // Same borrower and resource, two distinct loan cycles
        let mut first = entry(1, ReservationState::Borrow, day(0));
        first.label = "same-book".to_string();
        let mut second = entry(2, ReservationState::Borrow, day(40));
        second.label = "same-book".to_string();

        let views = project(vec![first, second]);
        assert_eq!(views.len(), 2);
    }
}
