//! Comment/rating model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Reader comment and rating attached to a resource
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Comment {
    pub id: i32,
    pub user_id: i32,
    pub resource_id: i32,
    pub content: Option<String>,
    /// 1..=5 stars
    pub rating: Option<i16>,
    pub date: DateTime<Utc>,
}

/// Comment joined with the commenting reader's name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CommentWithAuthor {
    pub id: i32,
    pub user_id: i32,
    pub resource_id: i32,
    pub content: Option<String>,
    pub rating: Option<i16>,
    pub date: DateTime<Utc>,
    pub author_name: Option<String>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    pub resource_id: i32,
    pub content: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}
