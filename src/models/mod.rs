//! Data models for the library server

pub mod book;
pub mod category;
pub mod reservation;
pub mod review;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook, UpdateBook};
pub use category::{Category, CreateCategory, UpdateCategory};
pub use reservation::{Reservation, ReservationResponse, ReservationStatus};
pub use review::{CreateReview, Review, ReviewQuery, UpdateReview};
