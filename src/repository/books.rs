//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::{contains_pattern, reference_violation, unique_violation};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

const DUPLICATE_ISBN: &str = "book with this ISBN already exists.";

/// Book columns plus the sorted ids of linked categories
const BOOK_COLUMNS: &str = r#"
    b.id, b.title, b.author, b.isbn, b.description, b.year, b.availability,
    ARRAY(
        SELECT bc.category_id FROM book_categories bc
        WHERE bc.book_id = b.id ORDER BY bc.category_id
    ) AS categories
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books b WHERE b.id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Filtered and ordered listing
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let order = query.order_clause()?;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM books b WHERE 1=1",
            BOOK_COLUMNS
        ));
        push_filters(&mut builder, query);
        builder.push(" ORDER BY ").push(order);

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Whether an active reservation currently holds the book
    pub async fn has_active_reservation(&self, id: i32) -> AppResult<bool> {
        let held: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE book_id = $1 AND status = 'active')",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(held)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Insert a book and its category links in one transaction
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, isbn, description, year, availability)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(&data.description)
        .bind(data.year)
        .bind(data.availability.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, "ISBN", DUPLICATE_ISBN))?;

        if let Some(ref categories) = data.categories {
            replace_categories(&mut tx, id, categories).await?;
        }

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Update the fields present in `data`
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE books SET id = id");

        macro_rules! set_field {
            ($field:expr, $column:literal) => {
                if let Some(ref val) = $field {
                    builder.push(concat!(", ", $column, " = ")).push_bind(val.clone());
                }
            };
        }

        set_field!(data.title, "title");
        set_field!(data.author, "author");
        set_field!(data.isbn, "isbn");
        set_field!(data.description, "description");
        set_field!(data.year, "year");
        set_field!(data.availability, "availability");

        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING id");

        builder
            .build()
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| unique_violation(e, "ISBN", DUPLICATE_ISBN))?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        if let Some(ref categories) = data.categories {
            replace_categories(&mut tx, id, categories).await?;
        }

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Delete a book; its reviews, reservations and category links go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    /// Link a category; linking twice is a no-op
    pub async fn add_category(&self, book_id: i32, category_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_categories (book_id, category_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(reference_violation)?;
        Ok(())
    }

    pub async fn remove_category(&self, book_id: i32, category_id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM book_categories WHERE book_id = $1 AND category_id = $2")
            .bind(book_id)
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn replace_categories(
    con: &mut PgConnection,
    book_id: i32,
    categories: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *con)
        .await?;

    if categories.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO book_categories (book_id, category_id)
        SELECT $1, UNNEST($2::int4[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(categories)
    .execute(&mut *con)
    .await
    .map_err(reference_violation)?;
    Ok(())
}

/// Append the WHERE conditions for `query` to a `... WHERE 1=1` statement
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &BookQuery) {
    if let Some(availability) = query.availability {
        builder.push(" AND b.availability = ").push_bind(availability);
    }

    if let Some(category) = query.category {
        builder
            .push(" AND EXISTS (SELECT 1 FROM book_categories bc WHERE bc.book_id = b.id AND bc.category_id = ")
            .push_bind(category)
            .push(")");
    }

    if let Some(ref name) = query.category_name {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM book_categories bc JOIN categories c ON c.id = bc.category_id \
                 WHERE bc.book_id = b.id AND c.name ILIKE ",
            )
            .push_bind(contains_pattern(name))
            .push(")");
    }

    if let Some(ref author) = query.author {
        builder.push(" AND b.author ILIKE ").push_bind(contains_pattern(author));
    }

    if let Some(ref title) = query.title {
        builder.push(" AND b.title ILIKE ").push_bind(contains_pattern(title));
    }

    if let Some(year) = query.year {
        builder.push(" AND b.year = ").push_bind(year);
    }
    if let Some(year_min) = query.year_min {
        builder.push(" AND b.year >= ").push_bind(year_min);
    }
    if let Some(year_max) = query.year_max {
        builder.push(" AND b.year <= ").push_bind(year_max);
    }

    if let Some(ref search) = query.search {
        let pattern = contains_pattern(search.trim());
        builder
            .push(" AND (b.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.author ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.isbn ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
