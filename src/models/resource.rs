//! Resource (catalog item) model and resource types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Availability flag for a resource.
///
/// Invariant: a resource is Available iff no reservation currently holds it
/// (Borrow, Renew or Late). Only the lifecycle engine flips this flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum Availability {
    NotAvailable = 0,
    Available = 1,
}

impl Availability {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn label(self) -> &'static str {
        match self {
            Availability::NotAvailable => "Not Available",
            Availability::Available => "Available",
        }
    }
}

impl From<i16> for Availability {
    fn from(v: i16) -> Self {
        match v {
            1 => Availability::Available,
            _ => Availability::NotAvailable,
        }
    }
}

/// Full resource model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Resource {
    pub id: i32,
    pub inventory_num: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub call_number: Option<String>,
    pub receiving_date: Option<String>,
    /// 1 available, 0 not available
    pub status: i16,
    pub num_of_borrows: i32,
    pub observation: Option<String>,
    pub description: Option<String>,
    pub type_id: Option<i32>,
}

/// Resource joined with the name of its type, for list views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResourceWithType {
    pub id: i32,
    pub inventory_num: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub call_number: Option<String>,
    pub receiving_date: Option<String>,
    pub status: i16,
    pub num_of_borrows: i32,
    pub observation: Option<String>,
    pub description: Option<String>,
    pub type_id: Option<i32>,
    pub type_name: Option<String>,
}

impl ResourceWithType {
    pub fn status_name(&self) -> &'static str {
        Availability::from(self.status).label()
    }
}

/// Resource type: named category with an optional borrow-window override.
///
/// An override greater than one day takes precedence over the user type's
/// borrow window when computing due dates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResourceType {
    pub id: i32,
    pub name: String,
    pub borrow_window_days: Option<i32>,
}

/// Create/update payload for resource types
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResourceTypePayload {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "Borrow window must be non-negative"))]
    pub borrow_window_days: Option<i32>,
}

/// Create resource request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResource {
    pub inventory_num: Option<String>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub call_number: Option<String>,
    pub receiving_date: Option<String>,
    pub observation: Option<String>,
    pub description: Option<String>,
    pub type_id: Option<i32>,
}

/// Update resource request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateResource {
    pub inventory_num: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub call_number: Option<String>,
    pub receiving_date: Option<String>,
    pub observation: Option<String>,
    pub description: Option<String>,
    pub type_id: Option<i32>,
}

/// Entry in the most-borrowed dashboard listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MostBorrowedResource {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub call_number: Option<String>,
    pub num_of_borrows: i32,
}
