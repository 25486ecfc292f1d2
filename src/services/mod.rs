//! Business logic services

pub mod auth;
pub mod circulation;
pub mod email;
pub mod history;
pub mod stats;

use crate::{
    config::{AuthConfig, EmailConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub circulation: circulation::CirculationService,
    pub history: history::HistoryService,
    pub stats: stats::StatsService,
    pub email: email::EmailService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, email_config: EmailConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            circulation: circulation::CirculationService::new(repository.clone()),
            history: history::HistoryService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            email: email::EmailService::new(email_config),
            repository,
        }
    }
}
