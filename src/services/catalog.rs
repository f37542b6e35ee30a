//! Catalog service: book CRUD

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPayload},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books, newest first
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_all().await
    }

    /// Create a new book, returning its id
    pub async fn create_book(&self, payload: BookPayload) -> AppResult<Uuid> {
        let fields = payload.into_fields().map_err(AppError::Validation)?;
        self.repository.books.create(&fields).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: Uuid, payload: BookPayload) -> AppResult<()> {
        let fields = payload.into_fields().map_err(AppError::Validation)?;
        self.repository.books.update(id, &fields).await
    }

    /// Delete a book
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
