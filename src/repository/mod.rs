//! Repository layer for database operations

pub mod books;
pub mod categories;
pub mod reservations;
pub mod reviews;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult, FieldErrors};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub categories: categories::CategoriesRepository,
    pub reviews: reviews::ReviewsRepository,
    pub reservations: reservations::ReservationsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            reviews: reviews::ReviewsRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Turn a unique violation into a field error, anything else goes through
/// [`reference_violation`]
pub(crate) fn unique_violation(err: sqlx::Error, field: &str, message: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::InvalidFields(FieldErrors::single(field, message))
        }
        err => reference_violation(err),
    }
}

/// Turn a foreign-key violation into a field error keyed by the referencing column
pub(crate) fn reference_violation(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            let field = match db.constraint() {
                Some(c) if c.contains("book_id") => "book",
                Some(c) if c.contains("user_id") => "user",
                Some(c) if c.contains("category_id") => "categories",
                _ => FieldErrors::NON_FIELD,
            };
            AppError::InvalidFields(FieldErrors::single(
                field,
                "Referenced object does not exist.",
            ))
        }
        err => AppError::Database(err),
    }
}

/// ILIKE pattern matching `term` anywhere, with wildcards in `term` escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
