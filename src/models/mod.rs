//! Data models for Libris

pub mod audit;
pub mod comment;
pub mod reservation;
pub mod resource;
pub mod staff;
pub mod suggestion;
pub mod user;

// Re-export commonly used types
pub use audit::AuditLog;
pub use comment::Comment;
pub use reservation::{HistoryRecord, LoanPolicy, LoanView, Reservation, ReservationState};
pub use resource::{Availability, Resource, ResourceType};
pub use staff::{Claims, Staff, StaffType};
pub use suggestion::Suggestion;
pub use user::{User, UserType};
