//! Categories service

use validator::Validate;

use crate::{
    error::AppResult,
    models::category::{Category, CreateCategory, UpdateCategory},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        data.validate()?;
        self.repository.categories.create(&data.name).await
    }

    pub async fn replace(&self, id: i32, data: &CreateCategory) -> AppResult<Category> {
        data.validate()?;
        self.repository.categories.rename(id, &data.name).await
    }

    /// Partial update; an empty body returns the category unchanged
    pub async fn update(&self, id: i32, data: &UpdateCategory) -> AppResult<Category> {
        data.validate()?;
        match data.name {
            Some(ref name) => self.repository.categories.rename(id, name).await,
            None => self.repository.categories.get_by_id(id).await,
        }
    }

    /// Delete a category; books only lose the link
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.categories.delete(id).await
    }
}
