//! Business logic services

pub mod books;
pub mod categories;
pub mod reservations;
pub mod reviews;

use std::sync::Arc;

use crate::{clock::Clock, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub categories: categories::CategoriesService,
    pub reviews: reviews::ReviewsService,
    pub reservations: reservations::ReservationsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and time source
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            reviews: reviews::ReviewsService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(
                Arc::new(repository.reservations.clone()),
                clock,
            ),
            repository,
        }
    }

    /// Check the database answers
    pub async fn check_database(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
