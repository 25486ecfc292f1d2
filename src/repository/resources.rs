//! Resources (catalog) repository for database operations
//!
//! The availability flag is read here but only ever written by the
//! reservations repository, which owns the lifecycle.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::resource::{
        CreateResource, MostBorrowedResource, Resource, ResourceType, ResourceTypePayload,
        ResourceWithType, UpdateResource,
    },
};

#[derive(Clone)]
pub struct ResourcesRepository {
    pool: Pool<Postgres>,
}

impl ResourcesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get resource by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Resource> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource with id {} not found", id)))
    }

    /// Resource joined with its type (for borrow-window resolution)
    pub async fn get_with_type(&self, id: i32) -> AppResult<(Resource, Option<ResourceType>)> {
        let resource = self.get_by_id(id).await?;
        let resource_type = match resource.type_id {
            Some(type_id) => {
                sqlx::query_as::<_, ResourceType>("SELECT * FROM resource_types WHERE id = $1")
                    .bind(type_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };
        Ok((resource, resource_type))
    }

    /// List all resources joined with their type names
    pub async fn list(&self) -> AppResult<Vec<ResourceWithType>> {
        let resources = sqlx::query_as::<_, ResourceWithType>(
            r#"
            SELECT r.*, rt.name AS type_name
            FROM resources r
            LEFT JOIN resource_types rt ON r.type_id = rt.id
            ORDER BY r.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }

    /// Create a new resource (starts Available with zero borrows)
    pub async fn create(&self, resource: &CreateResource) -> AppResult<Resource> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (inventory_num, title, author, editor, isbn, price,
                                   call_number, receiving_date, status, num_of_borrows,
                                   observation, description, type_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, 0, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&resource.inventory_num)
        .bind(&resource.title)
        .bind(&resource.author)
        .bind(&resource.editor)
        .bind(&resource.isbn)
        .bind(resource.price)
        .bind(&resource.call_number)
        .bind(&resource.receiving_date)
        .bind(&resource.observation)
        .bind(&resource.description)
        .bind(resource.type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(resource)
    }

    /// Update a resource's catalog fields
    pub async fn update(&self, id: i32, update: &UpdateResource) -> AppResult<Resource> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources SET
                inventory_num = COALESCE($1, inventory_num),
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                editor = COALESCE($4, editor),
                isbn = COALESCE($5, isbn),
                price = COALESCE($6, price),
                call_number = COALESCE($7, call_number),
                receiving_date = COALESCE($8, receiving_date),
                observation = COALESCE($9, observation),
                description = COALESCE($10, description),
                type_id = COALESCE($11, type_id)
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&update.inventory_num)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.editor)
        .bind(&update.isbn)
        .bind(update.price)
        .bind(&update.call_number)
        .bind(&update.receiving_date)
        .bind(&update.observation)
        .bind(&update.description)
        .bind(update.type_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resource with id {} not found", id)))?;

        Ok(resource)
    }

    /// Delete a resource
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Resource with id {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Count all resources
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resources")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Most borrowed resources, by lifetime borrow counter
    pub async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<MostBorrowedResource>> {
        let resources = sqlx::query_as::<_, MostBorrowedResource>(
            r#"
            SELECT id, title, author, call_number, num_of_borrows
            FROM resources
            ORDER BY num_of_borrows DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }

    // --- resource types ---

    pub async fn list_types(&self) -> AppResult<Vec<ResourceType>> {
        let types = sqlx::query_as::<_, ResourceType>("SELECT * FROM resource_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    pub async fn create_type(&self, payload: &ResourceTypePayload) -> AppResult<ResourceType> {
        let resource_type = sqlx::query_as::<_, ResourceType>(
            "INSERT INTO resource_types (name, borrow_window_days) VALUES ($1, $2) RETURNING *",
        )
        .bind(&payload.name)
        .bind(payload.borrow_window_days)
        .fetch_one(&self.pool)
        .await?;
        Ok(resource_type)
    }

    pub async fn update_type(
        &self,
        id: i32,
        payload: &ResourceTypePayload,
    ) -> AppResult<ResourceType> {
        let resource_type = sqlx::query_as::<_, ResourceType>(
            "UPDATE resource_types SET name = $1, borrow_window_days = $2 WHERE id = $3 RETURNING *",
        )
        .bind(&payload.name)
        .bind(payload.borrow_window_days)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resource type with id {} not found", id)))?;
        Ok(resource_type)
    }

    pub async fn delete_type(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM resource_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Resource type with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
