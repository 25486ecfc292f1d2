//! Acquisition suggestion model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Reader suggestion for a title the library should acquire
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Suggestion {
    pub id: i32,
    pub user_id: Option<i32>,
    pub title: String,
    pub author: Option<String>,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
}

/// Create suggestion request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSuggestion {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub note: Option<String>,
}
