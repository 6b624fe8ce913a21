//! Books service

use validator::Validate;

use crate::{
    error::{AppResult, FieldErrors},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

const AVAILABILITY_HELD: &str =
    "Availability cannot be changed while the book has an active reservation.";

/// Whether `requested` would flip the stored availability
fn changes_availability(current: bool, requested: Option<bool>) -> bool {
    requested.map_or(false, |wanted| wanted != current)
}

fn unknown_categories(missing: &[i32]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for id in missing {
        errors.add(
            "categories",
            format!("Invalid pk \"{}\" - object does not exist.", id),
        );
    }
    errors
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.search(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()?;
        self.check_categories(data.categories.as_deref()).await?;

        let book = self.repository.books.create(data).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    /// Full replacement; omitted availability and categories are kept
    pub async fn replace(&self, id: i32, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        self.update(id, &data.into()).await
    }

    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        data.validate()?;
        let current = self.repository.books.get_by_id(id).await?;

        let mut errors = FieldErrors::new();
        if let Some(ref categories) = data.categories {
            let missing = self.repository.categories.missing_ids(categories).await?;
            errors.merge(unknown_categories(&missing));
        }
        if changes_availability(current.availability, data.availability)
            && self.repository.books.has_active_reservation(id).await?
        {
            errors.add("availability", AVAILABILITY_HELD);
        }
        errors.into_result()?;

        self.repository.books.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    /// Link the category named `name` to a book
    pub async fn add_category(&self, id: i32, name: &str) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await?;
        let category = self.repository.categories.get_by_name(name).await?;
        self.repository.books.add_category(id, category.id).await?;
        self.repository.books.get_by_id(id).await
    }

    /// Unlink the category named `name` from a book
    pub async fn remove_category(&self, id: i32, name: &str) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;
        let category = self.repository.categories.get_by_name(name).await?;
        self.repository.books.remove_category(id, category.id).await
    }

    async fn check_categories(&self, categories: Option<&[i32]>) -> AppResult<()> {
        match categories {
            Some(ids) if !ids.is_empty() => {
                let missing = self.repository.categories.missing_ids(ids).await?;
                unknown_categories(&missing).into_result()
            }
            _ => Ok(()),
        }
    }
}
