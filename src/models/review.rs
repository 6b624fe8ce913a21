//! Review model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Review of a book by a user. One review per (user, book).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i32,
    /// Rating from 1 to 5
    pub rating: i32,
    pub content: String,
    #[serde(rename = "book")]
    pub book_id: i32,
    #[serde(rename = "user")]
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create (or fully replace) a review
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    #[validate(length(min = 10, max = 500, message = "Content must be between 10 and 500 characters."))]
    pub content: String,
    /// Book id
    pub book: i32,
    /// User id
    pub user: i32,
}

/// Partial review update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: Option<i32>,
    #[validate(length(min = 10, max = 500, message = "Content must be between 10 and 500 characters."))]
    pub content: Option<String>,
    pub book: Option<i32>,
    pub user: Option<i32>,
}

impl From<CreateReview> for UpdateReview {
    fn from(review: CreateReview) -> Self {
        Self {
            rating: Some(review.rating),
            content: Some(review.content),
            book: Some(review.book),
            user: Some(review.user),
        }
    }
}

/// Review listing filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    /// Only reviews of this book
    pub book: Option<i32>,
    /// Only reviews written by this user
    pub user: Option<i32>,
}
