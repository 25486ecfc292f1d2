//! Repository layer for database operations

pub mod audit;
pub mod comments;
pub mod reservations;
pub mod resources;
pub mod staff;
pub mod suggestions;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub staff: staff::StaffRepository,
    pub resources: resources::ResourcesRepository,
    pub reservations: reservations::ReservationsRepository,
    pub comments: comments::CommentsRepository,
    pub suggestions: suggestions::SuggestionsRepository,
    pub audit: audit::AuditRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            staff: staff::StaffRepository::new(pool.clone()),
            resources: resources::ResourcesRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            comments: comments::CommentsRepository::new(pool.clone()),
            suggestions: suggestions::SuggestionsRepository::new(pool.clone()),
            audit: audit::AuditRepository::new(pool.clone()),
            pool,
        }
    }
}
