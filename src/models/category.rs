//! Category model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Category record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Create (or fully replace) a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    /// Category name, unique
    #[validate(length(min = 3, max = 50, message = "Name must be between 3 and 50 characters."))]
    pub name: String,
}

/// Partial category update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 3, max = 50, message = "Name must be between 3 and 50 characters."))]
    pub name: Option<String>,
}
