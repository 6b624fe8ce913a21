//! Reviews service

use validator::Validate;

use crate::{
    error::{AppResult, FieldErrors},
    models::review::{CreateReview, Review, ReviewQuery, UpdateReview},
    repository::Repository,
};

/// Apply a partial update on top of a stored review
fn merge(current: &Review, data: &UpdateReview) -> CreateReview {
    CreateReview {
        rating: data.rating.unwrap_or(current.rating),
        content: data.content.clone().unwrap_or_else(|| current.content.clone()),
        book: data.book.unwrap_or(current.book_id),
        user: data.user.unwrap_or(current.user_id),
    }
}

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ReviewQuery) -> AppResult<Vec<Review>> {
        self.repository.reviews.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Review> {
        self.repository.reviews.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateReview) -> AppResult<Review> {
        data.validate()?;
        self.check_references(data.book, data.user).await?;
        self.repository.reviews.create(data).await
    }

    pub async fn replace(&self, id: i32, data: CreateReview) -> AppResult<Review> {
        data.validate()?;
        self.update(id, &data.into()).await
    }

    pub async fn update(&self, id: i32, data: &UpdateReview) -> AppResult<Review> {
        data.validate()?;
        let current = self.repository.reviews.get_by_id(id).await?;
        let merged = merge(&current, data);
        self.check_references(merged.book, merged.user).await?;
        self.repository.reviews.update(id, &merged).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.reviews.delete(id).await
    }

    async fn check_references(&self, book: i32, user: i32) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        if !self.repository.books.exists(book).await? {
            errors.add("book", format!("Invalid pk \"{}\" - object does not exist.", book));
        }
        if !self.repository.users.exists(user).await? {
            errors.add("user", format!("Invalid pk \"{}\" - object does not exist.", user));
        }
        errors.into_result()
    }
}
