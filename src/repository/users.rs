//! Readers repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserType, UserTypePayload, UserWithType},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reader by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User with id {} not found", id)))
    }

    /// Get reader by email (login path)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Reader joined with the user's type, including circulation windows
    pub async fn get_with_type(&self, id: i32) -> AppResult<(User, Option<UserType>)> {
        let user = self.get_by_id(id).await?;
        let user_type = match user.type_id {
            Some(type_id) => {
                sqlx::query_as::<_, UserType>("SELECT * FROM user_types WHERE id = $1")
                    .bind(type_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };
        Ok((user, user_type))
    }

    /// List readers, optionally filtered by account status
    pub async fn list(&self, status: Option<i16>) -> AppResult<Vec<UserWithType>> {
        let query = r#"
            SELECT u.id, u.name, u.email, u.phone, u.birthdate,
                   ut.name AS type_name, u.status
            FROM users u
            LEFT JOIN user_types ut ON u.type_id = ut.id
        "#;

        let users = match status {
            Some(status) => {
                sqlx::query_as::<_, UserWithType>(&format!(
                    "{} WHERE u.status = $1 ORDER BY u.name",
                    query
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, UserWithType>(&format!("{} ORDER BY u.name", query))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(users)
    }

    /// Create a new reader; `password` is already hashed by the caller
    pub async fn create(&self, reader: &CreateUser, password: Option<String>) -> AppResult<User> {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(&reader.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, phone, birthdate, address, type_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0)
            RETURNING *
            "#,
        )
        .bind(&reader.name)
        .bind(&reader.email)
        .bind(password)
        .bind(&reader.phone)
        .bind(&reader.birthdate)
        .bind(&reader.address)
        .bind(reader.type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update a reader
    pub async fn update(&self, id: i32, update: &UpdateUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($1, name),
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                birthdate = COALESCE($4, birthdate),
                address = COALESCE($5, address),
                type_id = COALESCE($6, type_id),
                status = COALESCE($7, status)
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.birthdate)
        .bind(&update.address)
        .bind(update.type_id)
        .bind(update.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::UserNotFound(format!("User with id {} not found", id)))?;

        Ok(user)
    }

    /// Flip a reader's account status (pending/verified moderation)
    pub async fn update_status(&self, id: i32, status: i16) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Bump the failed-login counter for an existing account
    pub async fn record_failed_login(&self, email: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET failed_logins = failed_logins + 1 WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Reset the failed-login counter after a successful login
    pub async fn reset_failed_logins(&self, email: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET failed_logins = 0 WHERE email = $1 AND failed_logins > 0")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update profile fields by email (self-service)
    pub async fn update_profile_by_email(
        &self,
        email: &str,
        name: Option<&str>,
        birthdate: Option<&str>,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($1, name),
                birthdate = COALESCE($2, birthdate),
                address = COALESCE($3, address),
                phone = COALESCE($4, phone)
            WHERE email = $5
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(birthdate)
        .bind(address)
        .bind(phone)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::UserNotFound(format!("User {} not found", email)))?;

        Ok(user)
    }

    /// Replace a reader's password hash
    pub async fn update_password(&self, email: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(format!("User {} not found", email)));
        }
        Ok(())
    }

    /// Delete a reader
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all readers
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // --- user types ---

    pub async fn list_types(&self) -> AppResult<Vec<UserType>> {
        let types = sqlx::query_as::<_, UserType>("SELECT * FROM user_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    pub async fn create_type(&self, payload: &UserTypePayload) -> AppResult<UserType> {
        let user_type = sqlx::query_as::<_, UserType>(
            r#"
            INSERT INTO user_types (name, borrow_window_days, max_active_loans, renew_window_days)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(payload.borrow_window_days)
        .bind(payload.max_active_loans)
        .bind(payload.renew_window_days)
        .fetch_one(&self.pool)
        .await?;
        Ok(user_type)
    }

    pub async fn update_type(&self, id: i32, payload: &UserTypePayload) -> AppResult<UserType> {
        let user_type = sqlx::query_as::<_, UserType>(
            r#"
            UPDATE user_types SET name = $1, borrow_window_days = $2,
                   max_active_loans = $3, renew_window_days = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(payload.borrow_window_days)
        .bind(payload.max_active_loans)
        .bind(payload.renew_window_days)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User type with id {} not found", id)))?;
        Ok(user_type)
    }

    pub async fn delete_type(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM user_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User type with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
