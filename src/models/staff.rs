//! Staff model, staff types and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Full staff model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Staff {
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
    pub crea_date: Option<DateTime<Utc>>,
}

/// Staff type: named role with a privilege list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffType {
    pub id: i32,
    pub name: String,
    pub privileges: Vec<String>,
}

/// Create/update payload for staff types
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StaffTypePayload {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub privileges: Vec<String>,
}

/// Create staff request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaff {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub type_id: Option<i32>,
}

/// Update own profile request (for authenticated staff or readers)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    pub old_password: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub new_password: String,
}

/// Role carried inside the access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Reader,
}

/// JWT claims for authenticated sessions.
///
/// Privileges are resolved from the staff type at login time; reader
/// tokens carry an empty privilege list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub id: i32,
    pub role: Role,
    pub privileges: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// Require a named staff privilege
    pub fn require(&self, privilege: &str) -> Result<(), AppError> {
        if self.is_staff() && self.privileges.iter().any(|p| p == privilege) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "'{}' privilege required",
                privilege
            )))
        }
    }

    /// Require any authenticated staff session
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Staff privileges required".to_string(),
            ))
        }
    }
}

/// Well-known privilege names looked up against the staff type
pub mod privileges {
    pub const CIRCULATION: &str = "circulation";
    pub const MANAGE_READERS: &str = "manage_readers";
    pub const MANAGE_RESOURCES: &str = "manage_resources";
    pub const ADMINISTRATION: &str = "administration";
    pub const VIEW_LOGS: &str = "view_logs";
}
