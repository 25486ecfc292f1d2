//! Staff repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::staff::{CreateStaff, Staff, StaffType, StaffTypePayload},
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get staff member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("Staff with id {} not found", id)))
    }

    /// Get staff member by email (login path)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(staff)
    }

    /// Privileges of a staff member, resolved through the staff type
    pub async fn get_privileges(&self, staff_id: i32) -> AppResult<Vec<String>> {
        let privileges: Option<Vec<String>> = sqlx::query_scalar(
            r#"
            SELECT st.privileges FROM staff s
            JOIN staff_types st ON s.type_id = st.id
            WHERE s.id = $1
            "#,
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(privileges.unwrap_or_default())
    }

    /// List all staff members
    pub async fn list(&self) -> AppResult<Vec<Staff>> {
        let staff = sqlx::query_as::<_, Staff>("SELECT * FROM staff ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(staff)
    }

    /// Create a staff member; `password_hash` is already hashed
    pub async fn create(&self, staff: &CreateStaff, password_hash: &str) -> AppResult<Staff> {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM staff WHERE email = $1")
            .bind(&staff.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let staff = sqlx::query_as::<_, Staff>(
            r#"
            INSERT INTO staff (name, email, password, phone, birthdate, address, type_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&staff.name)
        .bind(&staff.email)
        .bind(password_hash)
        .bind(&staff.phone)
        .bind(&staff.birthdate)
        .bind(&staff.address)
        .bind(staff.type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Update profile fields by email (self-service)
    pub async fn update_profile_by_email(
        &self,
        email: &str,
        name: Option<&str>,
        birthdate: Option<&str>,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<Staff> {
        let staff = sqlx::query_as::<_, Staff>(
            r#"
            UPDATE staff SET
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
        .ok_or_else(|| AppError::UserNotFound(format!("Staff {} not found", email)))?;

        Ok(staff)
    }

    /// Replace a staff member's password hash
    pub async fn update_password(&self, email: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE staff SET password = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(format!("Staff {} not found", email)));
        }
        Ok(())
    }

    /// Delete a staff member
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(format!("Staff with id {} not found", id)));
        }
        Ok(())
    }

    // --- staff types ---

    pub async fn list_types(&self) -> AppResult<Vec<StaffType>> {
        let types = sqlx::query_as::<_, StaffType>("SELECT * FROM staff_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    pub async fn create_type(&self, payload: &StaffTypePayload) -> AppResult<StaffType> {
        let staff_type = sqlx::query_as::<_, StaffType>(
            "INSERT INTO staff_types (name, privileges) VALUES ($1, $2) RETURNING *",
        )
        .bind(&payload.name)
        .bind(&payload.privileges)
        .fetch_one(&self.pool)
        .await?;
        Ok(staff_type)
    }

    pub async fn update_type(&self, id: i32, payload: &StaffTypePayload) -> AppResult<StaffType> {
        let staff_type = sqlx::query_as::<_, StaffType>(
            "UPDATE staff_types SET name = $1, privileges = $2 WHERE id = $3 RETURNING *",
        )
        .bind(&payload.name)
        .bind(&payload.privileges)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff type with id {} not found", id)))?;
        Ok(staff_type)
    }

    pub async fn delete_type(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM staff_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Staff type with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
