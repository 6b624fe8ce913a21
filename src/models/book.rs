//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book as stored, with the ids of its categories
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// ISBN with dashes (17 characters)
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    pub description: Option<String>,
    /// Release year
    pub year: i32,
    /// Whether the book can currently be reserved
    pub availability: bool,
    /// Category ids
    pub categories: Vec<i32>,
}

/// Create (or fully replace) a book
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters."))]
    pub title: String,
    #[validate(length(min = 3, max = 100, message = "Author must be between 3 and 100 characters."))]
    pub author: String,
    #[serde(rename = "ISBN", alias = "isbn", default)]
    #[validate(length(equal = 17, message = "ISBN must be exactly 17 characters (with dashes)."))]
    pub isbn: Option<String>,
    #[serde(default)]
    #[validate(length(min = 3, max = 500, message = "Description must be between 3 and 500 characters."))]
    pub description: Option<String>,
    #[validate(range(min = 1500, max = 2100, message = "Year must be between 1500 and 2100."))]
    pub year: i32,
    /// Defaults to `true` on creation, left unchanged on replacement when omitted
    #[serde(default)]
    pub availability: Option<bool>,
    /// Category ids, left unchanged on replacement when omitted
    #[serde(default)]
    pub categories: Option<Vec<i32>>,
}

/// Partial book update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters."))]
    pub title: Option<String>,
    #[validate(length(min = 3, max = 100, message = "Author must be between 3 and 100 characters."))]
    pub author: Option<String>,
    #[serde(rename = "ISBN", alias = "isbn", default)]
    #[validate(length(equal = 17, message = "ISBN must be exactly 17 characters (with dashes)."))]
    pub isbn: Option<String>,
    #[validate(length(min = 3, max = 500, message = "Description must be between 3 and 500 characters."))]
    pub description: Option<String>,
    #[validate(range(min = 1500, max = 2100, message = "Year must be between 1500 and 2100."))]
    pub year: Option<i32>,
    pub availability: Option<bool>,
    pub categories: Option<Vec<i32>>,
}

impl From<CreateBook> for UpdateBook {
    fn from(book: CreateBook) -> Self {
        Self {
            title: Some(book.title),
            author: Some(book.author),
            isbn: book.isbn,
            description: book.description,
            year: Some(book.year),
            availability: book.availability,
            categories: book.categories,
        }
    }
}

/// Book listing filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact availability
    pub availability: Option<bool>,
    /// Category id
    pub category: Option<i32>,
    /// Category name (case-insensitive substring)
    pub category_name: Option<String>,
    /// Author (case-insensitive substring)
    pub author: Option<String>,
    /// Title (case-insensitive substring)
    pub title: Option<String>,
    /// Exact release year
    pub year: Option<i32>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    /// Free text over title, author, description and ISBN
    pub search: Option<String>,
    /// `title`, `author`, `year` or `id`, prefixed with `-` for descending
    pub ordering: Option<String>,
}

impl BookQuery {
    /// ORDER BY clause for the requested ordering
    pub fn order_clause(&self) -> AppResult<&'static str> {
        let clause = match self.ordering.as_deref().unwrap_or("title") {
            "title" => "b.title ASC, b.id ASC",
            "-title" => "b.title DESC, b.id DESC",
            "author" => "b.author ASC, b.id ASC",
            "-author" => "b.author DESC, b.id DESC",
            "year" => "b.year ASC, b.id ASC",
            "-year" => "b.year DESC, b.id DESC",
            "id" => "b.id ASC",
            "-id" => "b.id DESC",
            other => {
                return Err(AppError::Validation(format!(
                    "Unknown ordering '{}'",
                    other
                )))
            }
        };
        Ok(clause)
    }
}
