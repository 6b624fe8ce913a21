//! Reservations storage.
//!
//! Every write that touches book availability runs in a single transaction
//! and takes the book with a conditional update, so two requests can never
//! both reserve the same available book.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::reference_violation;
use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::reservation::{
        NewReservation, Reservation, ReservationChanges, ReservationFilter, ReservationStatus,
        ALREADY_RETURNED, BOOK_NOT_AVAILABLE,
    },
};

/// Storage operations the reservation lifecycle relies on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Reservation>;

    async fn list(&self, filter: &ReservationFilter) -> AppResult<Vec<Reservation>>;

    /// Availability of a book, `None` when the book does not exist
    async fn book_availability(&self, book_id: i32) -> AppResult<Option<bool>>;

    async fn user_exists(&self, user_id: i32) -> AppResult<bool>;

    /// Take the book and insert an active reservation
    async fn insert_active(&self, new: &NewReservation) -> AppResult<Reservation>;

    /// Apply changes; an active reservation moving to another book takes the
    /// new book and releases the old one
    async fn update(&self, id: i32, changes: &ReservationChanges) -> AppResult<Reservation>;

    /// Mark completed and release the book. Fails if already completed.
    async fn complete(&self, id: i32, return_time: DateTime<Utc>) -> AppResult<Reservation>;

    /// Delete; an active reservation releases its book
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn book_not_available() -> AppError {
    AppError::InvalidFields(FieldErrors::single("book", BOOK_NOT_AVAILABLE))
}

/// Flip an available book to unavailable; `false` when it was not available
async fn take_book(con: &mut PgConnection, book_id: i32) -> AppResult<bool> {
    let result =
        sqlx::query("UPDATE books SET availability = FALSE WHERE id = $1 AND availability = TRUE")
            .bind(book_id)
            .execute(con)
            .await?;
    Ok(result.rows_affected() == 1)
}

async fn release_book(con: &mut PgConnection, book_id: i32) -> AppResult<()> {
    sqlx::query("UPDATE books SET availability = TRUE WHERE id = $1")
        .bind(book_id)
        .execute(con)
        .await?;
    Ok(())
}

#[async_trait]
impl ReservationStore for ReservationsRepository {
    async fn get(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    async fn list(&self, filter: &ReservationFilter) -> AppResult<Vec<Reservation>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM reservations WHERE 1=1");

        if let Some(now) = filter.overdue_at {
            builder
                .push(" AND status = ")
                .push_bind(ReservationStatus::Active)
                .push(" AND due_time < ")
                .push_bind(now);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(book_id) = filter.book_id {
            builder.push(" AND book_id = ").push_bind(book_id);
        }
        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<Reservation>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn book_availability(&self, book_id: i32) -> AppResult<Option<bool>> {
        let availability: Option<bool> =
            sqlx::query_scalar("SELECT availability FROM books WHERE id = $1")
                .bind(book_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(availability)
    }

    async fn user_exists(&self, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_active(&self, new: &NewReservation) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        if !take_book(&mut tx, new.book_id).await? {
            return Err(book_not_available());
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (status, reservation_time, due_time, book_id, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ReservationStatus::Active)
        .bind(new.reservation_time)
        .bind(new.due_time)
        .bind(new.book_id)
        .bind(new.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(reference_violation)?;

        tx.commit().await?;
        Ok(reservation)
    }

    async fn update(&self, id: i32, changes: &ReservationChanges) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;

        if changes.book_id != current.book_id && current.status == ReservationStatus::Active {
            if !take_book(&mut tx, changes.book_id).await? {
                return Err(book_not_available());
            }
            release_book(&mut tx, current.book_id).await?;
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET book_id = $1, reservation_time = $2, due_time = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(changes.book_id)
        .bind(changes.reservation_time)
        .bind(changes.due_time)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(reference_violation)?;

        tx.commit().await?;
        Ok(reservation)
    }

    async fn complete(&self, id: i32, return_time: DateTime<Utc>) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let completed = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = $1, return_time = $2, updated_at = NOW()
            WHERE id = $3 AND status <> $1
            RETURNING *
            "#,
        )
        .bind(ReservationStatus::Completed)
        .bind(return_time)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let reservation = match completed {
            Some(reservation) => reservation,
            None => {
                // Either missing or completed concurrently
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reservations WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(if exists {
                    AppError::BusinessRule(ALREADY_RETURNED.to_string())
                } else {
                    AppError::NotFound(format!("Reservation {} not found", id))
                });
            }
        };

        release_book(&mut tx, reservation.book_id).await?;

        tx.commit().await?;
        Ok(reservation)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted: Option<(i32, ReservationStatus)> =
            sqlx::query_as("DELETE FROM reservations WHERE id = $1 RETURNING book_id, status")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let (book_id, status) =
            deleted.ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;

        if status == ReservationStatus::Active {
            release_book(&mut tx, book_id).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
