//! Reviews repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::unique_violation;
use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::review::{CreateReview, Review, ReviewQuery},
};

const DUPLICATE_REVIEW: &str = "The fields user, book must make a unique set.";

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Newest first
    pub async fn list(&self, query: &ReviewQuery) -> AppResult<Vec<Review>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM reviews WHERE 1=1");
        if let Some(book) = query.book {
            builder.push(" AND book_id = ").push_bind(book);
        }
        if let Some(user) = query.user {
            builder.push(" AND user_id = ").push_bind(user);
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows = builder
            .build_query_as::<Review>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Review> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn create(&self, data: &CreateReview) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (rating, content, book_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.rating)
        .bind(&data.content)
        .bind(data.book)
        .bind(data.user)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, FieldErrors::NON_FIELD, DUPLICATE_REVIEW))
    }

    /// Overwrite every writable column
    pub async fn update(&self, id: i32, data: &CreateReview) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = $1, content = $2, book_id = $3, user_id = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.rating)
        .bind(&data.content)
        .bind(data.book)
        .bind(data.user)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, FieldErrors::NON_FIELD, DUPLICATE_REVIEW))?
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }
        Ok(())
    }
}
