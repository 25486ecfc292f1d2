//! Authentication service: staff and reader login, password management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        staff::{Claims, Role, Staff},
        user::{CreateUser, User},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Hash a password with a fresh salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Staff login: verify credentials and issue claims with the privilege
    /// list resolved from the staff type
    pub async fn login_staff(&self, email: &str, password: &str) -> AppResult<(Staff, Claims, String)> {
        let staff = self
            .repository
            .staff
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        let hash = staff
            .password
            .as_deref()
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;
        if !self.verify_password(password, hash) {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let privileges = self.repository.staff.get_privileges(staff.id).await?;
        let claims = self.build_claims(&staff.email, staff.id, Role::Staff, privileges);
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        self.repository
            .audit
            .add(&staff.email, "logged in")
            .await?;

        Ok((staff, claims, token))
    }

    /// Reader login
    pub async fn login_reader(&self, email: &str, password: &str) -> AppResult<(User, String)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        let hash = user
            .password
            .as_deref()
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;
        if !self.verify_password(password, hash) {
            self.repository.users.record_failed_login(&user.email).await?;
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }
        self.repository.users.reset_failed_logins(&user.email).await?;

        let claims = self.build_claims(&user.email, user.id, Role::Reader, Vec::new());
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        Ok((user, token))
    }

    /// Reader self-signup; the account starts pending until staff verify it
    pub async fn signup_reader(&self, mut reader: CreateUser) -> AppResult<User> {
        let password = reader
            .password
            .take()
            .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;
        let hash = self.hash_password(&password)?;
        self.repository.users.create(&reader, Some(hash)).await
    }

    /// Change a staff member's password after verifying the old one
    pub async fn change_staff_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let staff = self
            .repository
            .staff
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("Staff {} not found", email)))?;

        let hash = staff
            .password
            .as_deref()
            .ok_or_else(|| AppError::Authentication("No password set".to_string()))?;
        if !self.verify_password(old_password, hash) {
            return Err(AppError::BadRequest("Old password is incorrect".to_string()));
        }

        let new_hash = self.hash_password(new_password)?;
        self.repository.staff.update_password(email, &new_hash).await
    }

    /// Change a reader's password after verifying the old one
    pub async fn change_reader_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", email)))?;

        let hash = user
            .password
            .as_deref()
            .ok_or_else(|| AppError::Authentication("No password set".to_string()))?;
        if !self.verify_password(old_password, hash) {
            return Err(AppError::BadRequest("Old password is incorrect".to_string()));
        }

        let new_hash = self.hash_password(new_password)?;
        self.repository.users.update_password(email, &new_hash).await
    }

    fn build_claims(&self, email: &str, id: i32, role: Role, privileges: Vec<String>) -> Claims {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.config.jwt_expiration_hours as i64);
        Claims {
            sub: email.to_string(),
            id,
            role,
            privileges,
            exp: expiry.timestamp(),
            iat: now.timestamp(),
        }
    }
}
