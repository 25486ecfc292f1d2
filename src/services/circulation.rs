//! Circulation service: the loan lifecycle engine
//!
//! Entry point for every mutation of the reservation ledger. Resolves the
//! borrow policy for the (user type, resource type) pair, enforces the
//! borrow limit and the transition table, and drives the late sweep.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{CreateReservation, LoanPolicy, Reservation, ReservationState, TransactionView},
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all transactions with borrower name and title
    pub async fn list_transactions(&self) -> AppResult<Vec<TransactionView>> {
        self.repository.reservations.list_transactions().await
    }

    /// List currently late loans
    pub async fn list_late(&self) -> AppResult<Vec<TransactionView>> {
        let transactions = self.repository.reservations.list_transactions().await?;
        Ok(transactions
            .into_iter()
            .filter(|t| t.state_label == ReservationState::Late.label())
            .collect())
    }

    /// Create a new loan.
    ///
    /// The user's type sets the concurrent-loan cap; a missing type or a
    /// null cap means the user has no borrowing privilege at all. The
    /// repository enforces the cap, the availability flip and the history
    /// append atomically.
    pub async fn create_loan(&self, request: CreateReservation) -> AppResult<Reservation> {
        if request.state != ReservationState::Borrow {
            return Err(AppError::InvalidTransition(format!(
                "a new loan must start in Borrow, not {}",
                request.state.label()
            )));
        }

        let (_user, user_type) = self.repository.users.get_with_type(request.user_id).await?;
        self.repository
            .resources
            .get_by_id(request.resource_id)
            .await?;

        let allowed = user_type
            .as_ref()
            .map(|t| t.allowed_active_count())
            .unwrap_or(0);
        if allowed == 0 {
            return Err(AppError::LimitExceeded(
                "user type grants no borrowing privilege".to_string(),
            ));
        }

        let reservation = self.repository.reservations.create(&request, allowed).await?;
        tracing::info!(
            reservation_id = reservation.id,
            user_id = request.user_id,
            resource_id = request.resource_id,
            "loan created"
        );
        Ok(reservation)
    }

    /// Apply a lifecycle transition to an existing loan
    pub async fn transition_loan(
        &self,
        reservation_id: i32,
        new_state: ReservationState,
    ) -> AppResult<Reservation> {
        // Validated again under lock inside the repository; this early
        // check produces the error before any transaction is opened.
        let current = self.repository.reservations.get_by_id(reservation_id).await?;
        current.state.check_transition(new_state)?;

        let reservation = self
            .repository
            .reservations
            .transition(reservation_id, new_state)
            .await?;
        tracing::info!(
            reservation_id,
            from = current.state.label(),
            to = new_state.label(),
            "loan transitioned"
        );
        Ok(reservation)
    }

    /// Delete a loan outright, freeing the resource
    pub async fn delete_loan(&self, reservation_id: i32) -> AppResult<()> {
        self.repository.reservations.delete(reservation_id).await
    }

    /// Sweep active loans past their due date into Late.
    ///
    /// Idempotent: rows already Late or returned are not in the active set,
    /// and the per-row update is guarded on the active states. Returns the
    /// number of loans actually moved.
    pub async fn sweep_late(&self) -> AppResult<u64> {
        let now = Utc::now();
        let active = self
            .repository
            .reservations
            .list_active_with_windows()
            .await?;

        let mut updated = 0u64;
        for loan in active {
            let overdue = loan.policy().is_overdue(loan.state, loan.state_date, now);
            if overdue && self.repository.reservations.mark_late(loan.id).await? {
                updated += 1;
            }
        }

        if updated > 0 {
            tracing::info!(updated, "late sweep marked overdue loans");
        }
        Ok(updated)
    }

    /// Borrow policy for a (user, resource) pair, mainly for display
    pub async fn policy_for(&self, user_id: i32, resource_id: i32) -> AppResult<LoanPolicy> {
        let (_user, user_type) = self.repository.users.get_with_type(user_id).await?;
        let (_resource, resource_type) =
            self.repository.resources.get_with_type(resource_id).await?;

        Ok(LoanPolicy::resolve(
            user_type.as_ref().and_then(|t| t.borrow_window_days),
            user_type.as_ref().and_then(|t| t.renew_window_days),
            resource_type.as_ref().and_then(|t| t.borrow_window_days),
        ))
    }
}
