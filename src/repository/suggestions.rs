//! Suggestions repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::suggestion::{CreateSuggestion, Suggestion},
};

#[derive(Clone)]
pub struct SuggestionsRepository {
    pool: Pool<Postgres>,
}

impl SuggestionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All suggestions, newest first
    pub async fn list(&self) -> AppResult<Vec<Suggestion>> {
        let suggestions =
            sqlx::query_as::<_, Suggestion>("SELECT * FROM suggestions ORDER BY date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(suggestions)
    }

    /// Create a suggestion
    pub async fn create(
        &self,
        user_id: Option<i32>,
        suggestion: &CreateSuggestion,
    ) -> AppResult<Suggestion> {
        let suggestion = sqlx::query_as::<_, Suggestion>(
            r#"
            INSERT INTO suggestions (user_id, title, author, note, date)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&suggestion.title)
        .bind(&suggestion.author)
        .bind(&suggestion.note)
        .fetch_one(&self.pool)
        .await?;
        Ok(suggestion)
    }

    /// Delete a suggestion
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM suggestions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Suggestion with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
