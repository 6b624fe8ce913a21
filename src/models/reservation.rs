//! Reservation model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

pub const DUE_TIME_NOT_FUTURE: &str = "Due time must be in the future.";
pub const DUE_TIME_NOT_AFTER_RESERVATION: &str = "Due time must be after reservation time.";
pub const BOOK_NOT_AVAILABLE: &str = "This book is not available for reservation.";
pub const ALREADY_RETURNED: &str = "This book has already been returned.";

/// Reservation status.
///
/// Only `Active` and `Completed` are reached by the lifecycle; `Cancelled` and
/// `Overdue` exist in the schema but nothing assigns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Completed,
    Cancelled,
    Overdue,
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Active
    }
}

/// Reservation row
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Reservation {
    pub id: i32,
    pub status: ReservationStatus,
    pub reservation_time: DateTime<Utc>,
    pub due_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
    pub book_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Active and past its due time
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Active && self.due_time < now
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReservationStatus::Completed
    }
}

/// Reservation as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub id: i32,
    pub status: ReservationStatus,
    pub reservation_time: DateTime<Utc>,
    pub due_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
    /// Book id
    pub book: i32,
    /// User id
    pub user: i32,
    /// Computed at read time
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationResponse {
    pub fn new(reservation: Reservation, now: DateTime<Utc>) -> Self {
        let is_overdue = reservation.is_overdue(now);
        Self {
            id: reservation.id,
            status: reservation.status,
            reservation_time: reservation.reservation_time,
            due_time: reservation.due_time,
            return_time: reservation.return_time,
            book: reservation.book_id,
            user: reservation.user_id,
            is_overdue,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}

/// Create reservation request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReservation {
    /// Book id
    pub book: i32,
    /// User id
    pub user: i32,
    /// Must be in the future and after the reservation time
    pub due_time: DateTime<Utc>,
    /// Defaults to now
    pub reservation_time: Option<DateTime<Utc>>,
}

/// Full reservation replacement (PUT)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplaceReservation {
    pub book: i32,
    pub due_time: DateTime<Utc>,
    pub reservation_time: Option<DateTime<Utc>>,
}

/// Partial reservation update (PATCH)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateReservation {
    pub book: Option<i32>,
    pub due_time: Option<DateTime<Utc>>,
    pub reservation_time: Option<DateTime<Utc>>,
}

impl From<ReplaceReservation> for UpdateReservation {
    fn from(data: ReplaceReservation) -> Self {
        Self {
            book: Some(data.book),
            due_time: Some(data.due_time),
            reservation_time: data.reservation_time,
        }
    }
}

/// Return action body; every field is optional
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReturnReservation {
    /// When the book was returned (defaults to now)
    pub return_time: Option<DateTime<Utc>>,
}

/// Reservation listing filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReservationQuery {
    /// `true` keeps only active reservations past their due time
    pub overdue: Option<String>,
    pub status: Option<ReservationStatus>,
    /// Book id
    pub book: Option<i32>,
    /// User id
    pub user: Option<i32>,
}

impl ReservationQuery {
    pub fn overdue_only(&self) -> bool {
        self.overdue
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Validated reservation ready to be stored as active
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub book_id: i32,
    pub user_id: i32,
    pub reservation_time: DateTime<Utc>,
    pub due_time: DateTime<Utc>,
}

/// Validated changes to an existing reservation
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationChanges {
    pub book_id: i32,
    pub reservation_time: DateTime<Utc>,
    pub due_time: DateTime<Utc>,
}

/// Storage-level listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationFilter {
    /// Keep active reservations due strictly before this instant
    pub overdue_at: Option<DateTime<Utc>>,
    pub status: Option<ReservationStatus>,
    pub book_id: Option<i32>,
    pub user_id: Option<i32>,
}
