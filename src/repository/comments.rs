//! Comments/ratings repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::comment::{Comment, CommentWithAuthor, CreateComment},
};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Comments on a resource, newest first
    pub async fn list_for_resource(&self, resource_id: i32) -> AppResult<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.*, u.name AS author_name
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.resource_id = $1
            ORDER BY c.date DESC
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    /// Create a comment
    pub async fn create(&self, user_id: i32, comment: &CreateComment) -> AppResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (user_id, resource_id, content, rating, date)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(comment.resource_id)
        .bind(&comment.content)
        .bind(comment.rating)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    /// Delete a comment
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Comment with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
