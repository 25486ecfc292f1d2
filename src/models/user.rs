//! Reader (user) model and user types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Reader account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum UserStatus {
    Pending = 0,
    Verified = 1,
}

impl From<i16> for UserStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => UserStatus::Verified,
            _ => UserStatus::Pending,
        }
    }
}

/// Full reader model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub type_id: Option<i32>,
    pub status: i16,
    pub failed_logins: i32,
    pub crea_date: Option<DateTime<Utc>>,
}

/// Reader joined with the name of its user type, for list views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserWithType {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub status: i16,
}

/// User type: circulation policy attached to a class of readers.
///
/// `max_active_loans` of zero or null means the type has no borrowing
/// privilege at all.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserType {
    pub id: i32,
    pub name: String,
    pub borrow_window_days: Option<i32>,
    pub max_active_loans: Option<i32>,
    pub renew_window_days: Option<i32>,
}

impl UserType {
    /// Concurrent active-loan cap; missing means no borrowing allowed
    pub fn allowed_active_count(&self) -> i64 {
        i64::from(self.max_active_loans.unwrap_or(0).max(0))
    }
}

/// Create/update payload for user types
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserTypePayload {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "Borrow window must be non-negative"))]
    pub borrow_window_days: Option<i32>,
    #[validate(range(min = 0, message = "Loan cap must be non-negative"))]
    pub max_active_loans: Option<i32>,
    #[validate(range(min = 0, message = "Renew window must be non-negative"))]
    pub renew_window_days: Option<i32>,
}

/// Create reader request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub type_id: Option<i32>,
}

/// Update reader request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub type_id: Option<i32>,
    pub status: Option<i16>,
}

/// Reader list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Filter by account status: 0 pending, 1 verified
    pub status: Option<i16>,
}
