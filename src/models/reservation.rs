//! Reservation (loan) lifecycle model
//!
//! The reservation ledger holds one row per outstanding loan. Each row
//! carries a lifecycle state and the date that state began; every accepted
//! transition is also appended to the history log, which outlives the
//! ledger row itself.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use crate::error::AppError;

/// Lifecycle state of a reservation.
///
/// `Return` is terminal: the ledger row is deleted after the final history
/// record is written. The numeric values are the canonical persisted codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum ReservationState {
    Borrow = 1,
    Return = 2,
    RenewOne = 3,
    Late = 4,
    RenewTwo = 5,
}

impl ReservationState {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Display label, matching what the frontend renders in transaction lists
    pub fn label(self) -> &'static str {
        match self {
            ReservationState::Borrow => "Borrow",
            ReservationState::Return => "Return",
            ReservationState::RenewOne => "Renew",
            ReservationState::Late => "Late",
            ReservationState::RenewTwo => "Renew",
        }
    }

    /// States that count toward a user's borrow limit
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ReservationState::Borrow | ReservationState::RenewOne | ReservationState::RenewTwo
        )
    }

    /// States in which the reservation still holds the resource
    pub fn holds_resource(self) -> bool {
        self.is_active() || self == ReservationState::Late
    }

    /// Whether `self -> to` is an allowed lifecycle transition
    pub fn can_transition_to(self, to: ReservationState) -> bool {
        use ReservationState::*;
        matches!(
            (self, to),
            (Borrow, RenewOne)
                | (Borrow, Return)
                | (Borrow, Late)
                | (RenewOne, RenewTwo)
                | (RenewOne, Return)
                | (RenewOne, Late)
                | (RenewTwo, Return)
                | (RenewTwo, Late)
                | (Late, Return)
        )
    }

    /// Validate a transition, producing the error the lifecycle engine surfaces
    pub fn check_transition(self, to: ReservationState) -> Result<(), AppError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "cannot move a loan from {} to {}",
                self.label(),
                to.label()
            )))
        }
    }
}

impl TryFrom<i16> for ReservationState {
    type Error = AppError;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(ReservationState::Borrow),
            2 => Ok(ReservationState::Return),
            3 => Ok(ReservationState::RenewOne),
            4 => Ok(ReservationState::Late),
            5 => Ok(ReservationState::RenewTwo),
            other => Err(AppError::Validation(format!(
                "unknown reservation state code {}",
                other
            ))),
        }
    }
}

impl std::str::FromStr for ReservationState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrow" => Ok(ReservationState::Borrow),
            "return" => Ok(ReservationState::Return),
            "renew" | "renew1" => Ok(ReservationState::RenewOne),
            "late" => Ok(ReservationState::Late),
            "renew2" => Ok(ReservationState::RenewTwo),
            other => Err(AppError::Validation(format!(
                "unknown transaction type '{}'",
                other
            ))),
        }
    }
}

// SQLx conversions: states are stored as SMALLINT
impl sqlx::Type<Postgres> for ReservationState {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ReservationState {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let v: i16 = Decode::<Postgres>::decode(value)?;
        ReservationState::try_from(v).map_err(|e| e.to_string().into())
    }
}

impl Encode<'_, Postgres> for ReservationState {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <i16 as Encode<Postgres>>::encode(self.as_i16(), buf)
    }
}

/// Borrow-limit and due-date policy resolved for one (user, resource) pair.
///
/// The windows come from the user's type; a resource type may override the
/// borrow window when it defines one greater than a single day (reference
/// material with shortened or extended circulation periods).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    pub borrow_window_days: i64,
    pub renew_window_days: i64,
}

impl LoanPolicy {
    pub fn resolve(
        user_borrow_window: Option<i32>,
        user_renew_window: Option<i32>,
        resource_borrow_window: Option<i32>,
    ) -> Self {
        let borrow = match resource_borrow_window {
            Some(days) if days > 1 => days,
            _ => user_borrow_window.unwrap_or(0),
        };
        Self {
            borrow_window_days: i64::from(borrow.max(0)),
            renew_window_days: i64::from(user_renew_window.unwrap_or(0).max(0)),
        }
    }

    /// Due date for a loan that entered `state` at `state_date`.
    ///
    /// Return and Late carry no forward-looking due date; Late is already
    /// past expiry and display code computes its due date from the state
    /// that preceded it.
    pub fn due_date(
        &self,
        state: ReservationState,
        state_date: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let days = match state {
            ReservationState::Borrow => self.borrow_window_days,
            ReservationState::RenewOne => self.borrow_window_days + self.renew_window_days,
            ReservationState::RenewTwo => self.borrow_window_days + 2 * self.renew_window_days,
            ReservationState::Return | ReservationState::Late => return None,
        };
        Some(state_date + Duration::days(days))
    }

    /// Whether a loan that entered `state` at `state_date` is past its due
    /// date as of `now`. States without a due date are never overdue.
    pub fn is_overdue(
        &self,
        state: ReservationState,
        state_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        matches!(self.due_date(state, state_date), Some(due) if now > due)
    }
}

/// Active ledger row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub resource_id: i32,
    pub staff_id: Option<i32>,
    pub state: ReservationState,
    pub state_date: DateTime<Utc>,
}

/// Append-only history record, written on every accepted transition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HistoryRecord {
    pub id: i32,
    pub reservation_id: i32,
    pub resource_id: i32,
    pub user_id: i32,
    pub staff_id: Option<i32>,
    pub state: ReservationState,
    pub date: DateTime<Utc>,
}

/// Active loan joined with the policy windows needed to compute its due date
#[derive(Debug, Clone, FromRow)]
pub struct ActiveLoanRow {
    pub id: i32,
    pub user_id: i32,
    pub resource_id: i32,
    pub state: ReservationState,
    pub state_date: DateTime<Utc>,
    pub user_borrow_window: Option<i32>,
    pub user_renew_window: Option<i32>,
    pub resource_borrow_window: Option<i32>,
}

impl ActiveLoanRow {
    pub fn policy(&self) -> LoanPolicy {
        LoanPolicy::resolve(
            self.user_borrow_window,
            self.user_renew_window,
            self.resource_borrow_window,
        )
    }
}

/// Transaction listing entry (joined borrower name and title)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionView {
    pub id: i32,
    pub borrower_name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub state_label: String,
    pub date: DateTime<Utc>,
}

/// History row joined with a display label and the policy windows in force
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntryRow {
    pub reservation_id: i32,
    pub state: ReservationState,
    pub date: DateTime<Utc>,
    /// Resource title for the per-user view, borrower name for the
    /// per-resource view
    pub label: String,
    pub user_borrow_window: Option<i32>,
    pub user_renew_window: Option<i32>,
    pub resource_borrow_window: Option<i32>,
}

/// Denormalized per-loan projection reconstructed from the history log
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanView {
    pub label: String,
    pub reservation_date: Option<DateTime<Utc>>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: String,
}

/// Create loan request passed into the lifecycle engine
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservation {
    pub user_id: i32,
    pub resource_id: i32,
    pub staff_id: Option<i32>,
    pub state: ReservationState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn transition_table_allows_exactly_the_specified_edges() {
        use ReservationState::*;
        let all = [Borrow, Return, RenewOne, Late, RenewTwo];
        let allowed = [
            (Borrow, RenewOne),
            (Borrow, Return),
            (Borrow, Late),
            (RenewOne, RenewTwo),
            (RenewOne, Return),
            (RenewOne, Late),
            (RenewTwo, Return),
            (RenewTwo, Late),
            (Late, Return),
        ];
        for from in all {
            for to in all {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn return_is_terminal_and_late_only_returns() {
        use ReservationState::*;
        for to in [Borrow, Return, RenewOne, Late, RenewTwo] {
            assert!(!Return.can_transition_to(to));
        }
        assert!(Late.can_transition_to(Return));
        assert!(!Late.can_transition_to(RenewOne));
        assert!(!Late.can_transition_to(Late));
    }

    #[test]
    fn check_transition_reports_invalid_transition() {
        let err = ReservationState::Borrow
            .check_transition(ReservationState::RenewTwo)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn due_date_follows_the_window_formula() {
        let policy = LoanPolicy {
            borrow_window_days: 14,
            renew_window_days: 7,
        };
        assert_eq!(
            policy.due_date(ReservationState::Borrow, day(0)),
            Some(day(14))
        );
        // Renewal on day 10 resets the clock from the new state date
        assert_eq!(
            policy.due_date(ReservationState::RenewOne, day(10)),
            Some(day(31))
        );
        assert_eq!(
            policy.due_date(ReservationState::RenewTwo, day(10)),
            Some(day(38))
        );
        assert_eq!(policy.due_date(ReservationState::Return, day(0)), None);
        assert_eq!(policy.due_date(ReservationState::Late, day(0)), None);
    }

    #[test]
    fn resource_window_overrides_only_when_greater_than_one() {
        let p = LoanPolicy::resolve(Some(14), Some(7), Some(3));
        assert_eq!(p.borrow_window_days, 3);

        // An override of 1 day or less falls back to the user type window
        let p = LoanPolicy::resolve(Some(14), Some(7), Some(1));
        assert_eq!(p.borrow_window_days, 14);

        let p = LoanPolicy::resolve(Some(14), Some(7), None);
        assert_eq!(p.borrow_window_days, 14);

        // Missing user windows degrade to zero-day windows
        let p = LoanPolicy::resolve(None, None, None);
        assert_eq!(p.borrow_window_days, 0);
        assert_eq!(p.renew_window_days, 0);
    }

    #[test]
    fn sweep_marks_loans_past_their_window_and_spares_the_rest() {
        let policy = LoanPolicy {
            borrow_window_days: 14,
            renew_window_days: 7,
        };

        // Borrowed on day 0, due day 14
        assert!(policy.is_overdue(ReservationState::Borrow, day(0), day(15)));
        assert!(!policy.is_overdue(ReservationState::Borrow, day(0), day(14)));
        assert!(!policy.is_overdue(ReservationState::Borrow, day(0), day(3)));

        // Renewed on day 10, due day 31
        assert!(!policy.is_overdue(ReservationState::RenewOne, day(10), day(31)));
        assert!(policy.is_overdue(ReservationState::RenewOne, day(10), day(32)));

        // Late and Return have no due date to blow through
        assert!(!policy.is_overdue(ReservationState::Late, day(0), day(100)));
        assert!(!policy.is_overdue(ReservationState::Return, day(0), day(100)));
    }

    #[test]
    fn active_states_exclude_late_but_late_still_holds_the_resource() {
        use ReservationState::*;
        assert!(Borrow.is_active());
        assert!(RenewOne.is_active());
        assert!(RenewTwo.is_active());
        assert!(!Late.is_active());
        assert!(!Return.is_active());

        assert!(Late.holds_resource());
        assert!(!Return.holds_resource());
    }

    #[test]
    fn state_codes_round_trip() {
        for code in 1..=5i16 {
            let state = ReservationState::try_from(code).unwrap();
            assert_eq!(state.as_i16(), code);
        }
        assert!(ReservationState::try_from(0).is_err());
        assert!(ReservationState::try_from(6).is_err());
    }
}
