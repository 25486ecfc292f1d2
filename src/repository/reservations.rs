//! Reservation ledger repository
//!
//! Sole writer of reservation rows, history records and resource
//! availability flags. Multi-step lifecycle writes run inside a database
//! transaction so a rejected step leaves no partial state behind, and the
//! availability flip is a conditional update so two concurrent borrow
//! requests for the same resource cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{
        ActiveLoanRow, CreateReservation, HistoryEntryRow, HistoryRecord, Reservation,
        ReservationState, TransactionView,
    },
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// List all reservations joined with borrower name and title
    pub async fn list_transactions(&self) -> AppResult<Vec<TransactionView>> {
        let rows = sqlx::query_as::<_, (i32, Option<String>, String, ReservationState, DateTime<Utc>)>(
            r#"
            SELECT r.id, u.name, res.title, r.state, r.state_date
            FROM reservations r
            JOIN users u ON r.user_id = u.id
            JOIN resources res ON r.resource_id = res.id
            ORDER BY r.state_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, title, state, date)| TransactionView {
                id,
                borrower_name: name.unwrap_or_default(),
                title,
                state_label: state.label().to_string(),
                date,
            })
            .collect())
    }

    /// Active loans joined with the policy windows needed for due dates
    pub async fn list_active_with_windows(&self) -> AppResult<Vec<ActiveLoanRow>> {
        let rows = sqlx::query_as::<_, ActiveLoanRow>(
            r#"
            SELECT r.id, r.user_id, r.resource_id, r.state, r.state_date,
                   ut.borrow_window_days AS user_borrow_window,
                   ut.renew_window_days AS user_renew_window,
                   rt.borrow_window_days AS resource_borrow_window
            FROM reservations r
            JOIN users u ON r.user_id = u.id
            LEFT JOIN user_types ut ON u.type_id = ut.id
            JOIN resources res ON r.resource_id = res.id
            LEFT JOIN resource_types rt ON res.type_id = rt.id
            WHERE r.state IN (1, 3, 5)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Create a new loan.
    ///
    /// `allowed_active` is the borrow cap already resolved from the user's
    /// type. The count, the availability flip, the ledger insert, the
    /// history append and the borrow-counter bump all commit or fail as one.
    pub async fn create(
        &self,
        request: &CreateReservation,
        allowed_active: i64,
    ) -> AppResult<Reservation> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Lock the user row first: concurrent creates for the same user
        // serialize here, so both cannot pass the count below.
        let locked: Option<i32> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(request.user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::UserNotFound(format!(
                "User with id {} not found",
                request.user_id
            )));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE user_id = $1 AND state IN (1, 3, 5)",
        )
        .bind(request.user_id)
        .fetch_one(&mut *tx)
        .await?;

        if active >= allowed_active {
            return Err(AppError::LimitExceeded(format!(
                "user already holds {}/{} active loans",
                active, allowed_active
            )));
        }

        // Conditional flip: claims the resource only if it is still available
        let claimed = sqlx::query("UPDATE resources SET status = 0 WHERE id = $1 AND status = 1")
            .bind(request.resource_id)
            .execute(&mut *tx)
            .await?;

        if claimed.rows_affected() == 0 {
            return Err(AppError::ResourceNotAvailable(format!(
                "resource {} is not available",
                request.resource_id
            )));
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (user_id, resource_id, staff_id, state, state_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.resource_id)
        .bind(request.staff_id)
        .bind(request.state)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        Self::append_history(&mut tx, &reservation).await?;

        if request.state == ReservationState::Borrow {
            sqlx::query("UPDATE resources SET num_of_borrows = num_of_borrows + 1 WHERE id = $1")
                .bind(request.resource_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(reservation)
    }

    /// Apply a validated lifecycle transition.
    ///
    /// The row is re-read under lock and re-validated inside the
    /// transaction, so a concurrent transition cannot slip an illegal edge
    /// through.
    pub async fn transition(
        &self,
        id: i32,
        new_state: ReservationState,
    ) -> AppResult<Reservation> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        current.state.check_transition(new_state)?;

        let updated = if new_state == ReservationState::Return {
            let returned = Reservation {
                state: ReservationState::Return,
                state_date: now,
                ..current.clone()
            };
            Self::append_history(&mut tx, &returned).await?;

            sqlx::query("DELETE FROM reservations WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE resources SET status = 1 WHERE id = $1")
                .bind(current.resource_id)
                .execute(&mut *tx)
                .await?;

            returned
        } else {
            let updated = sqlx::query_as::<_, Reservation>(
                "UPDATE reservations SET state = $1, state_date = $2 WHERE id = $3 RETURNING *",
            )
            .bind(new_state)
            .bind(now)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            Self::append_history(&mut tx, &updated).await?;
            updated
        };

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a ledger row outright (administrative correction).
    ///
    /// Frees the resource but writes no history record: the loan is erased
    /// as if never entered, unlike a Return.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let resource_id: Option<i32> = sqlx::query_scalar(
            "DELETE FROM reservations WHERE id = $1 RETURNING resource_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let resource_id = resource_id
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        sqlx::query("UPDATE resources SET status = 1 WHERE id = $1")
            .bind(resource_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Mark one overdue loan as Late.
    ///
    /// Guarded on the active states so a concurrent sweep or return makes
    /// this a no-op rather than a double write; returns whether the row
    /// actually moved.
    pub async fn mark_late(&self, id: i32) -> AppResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations SET state = 4, state_date = $1
            WHERE id = $2 AND state IN (1, 3, 5)
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let moved = match updated {
            Some(reservation) => {
                Self::append_history(&mut tx, &reservation).await?;
                true
            }
            None => false,
        };

        tx.commit().await?;
        Ok(moved)
    }

    /// History rows for a user, joined with resource titles and the policy
    /// windows in force, oldest first
    pub async fn history_for_user(&self, user_id: i32) -> AppResult<Vec<HistoryEntryRow>> {
        let rows = sqlx::query_as::<_, HistoryEntryRow>(
            r#"
            SELECT h.reservation_id, h.state, h.date,
                   res.title AS label,
                   ut.borrow_window_days AS user_borrow_window,
                   ut.renew_window_days AS user_renew_window,
                   rt.borrow_window_days AS resource_borrow_window
            FROM history h
            JOIN resources res ON h.resource_id = res.id
            LEFT JOIN resource_types rt ON res.type_id = rt.id
            JOIN users u ON h.user_id = u.id
            LEFT JOIN user_types ut ON u.type_id = ut.id
            WHERE h.user_id = $1
            ORDER BY h.date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// History rows for a resource, joined with borrower names, oldest first
    pub async fn history_for_resource(&self, resource_id: i32) -> AppResult<Vec<HistoryEntryRow>> {
        let rows = sqlx::query_as::<_, HistoryEntryRow>(
            r#"
            SELECT h.reservation_id, h.state, h.date,
                   COALESCE(u.name, u.email) AS label,
                   ut.borrow_window_days AS user_borrow_window,
                   ut.renew_window_days AS user_renew_window,
                   rt.borrow_window_days AS resource_borrow_window
            FROM history h
            JOIN users u ON h.user_id = u.id
            LEFT JOIN user_types ut ON u.type_id = ut.id
            JOIN resources res ON h.resource_id = res.id
            LEFT JOIN resource_types rt ON res.type_id = rt.id
            WHERE h.resource_id = $1
            ORDER BY h.date
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Raw history records for a reservation, oldest first
    pub async fn history_for_reservation(&self, reservation_id: i32) -> AppResult<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRecord>(
            "SELECT * FROM history WHERE reservation_id = $1 ORDER BY date",
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count all reservations ever created (ledger plus history)
    pub async fn count_total(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT reservation_id) FROM history")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count reservations started in the current month
    pub async fn count_current_month(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT reservation_id) FROM history
            WHERE date_trunc('month', date) = date_trunc('month', NOW())
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Borrow counts per calendar month (1..=12) across the history log
    pub async fn monthly_borrow_counts(&self) -> AppResult<Vec<(i32, i64)>> {
        let rows = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT CAST(EXTRACT(MONTH FROM date) AS INT) AS month, COUNT(*) AS borrows
            FROM history
            WHERE state = 1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn append_history(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        reservation: &Reservation,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO history (reservation_id, resource_id, user_id, staff_id, state, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.resource_id)
        .bind(reservation.user_id)
        .bind(reservation.staff_id)
        .bind(reservation.state)
        .bind(reservation.state_date)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
