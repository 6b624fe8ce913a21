//! API handlers for the library REST endpoints

pub mod books;
pub mod categories;
pub mod health;
pub mod openapi;
pub mod reservations;
pub mod reviews;
