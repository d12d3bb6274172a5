//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
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

    /// List all books with their active-loan counts
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get a book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book. Titles are unique across the catalog.
    pub async fn create_book(&self, request: CreateBook) -> AppResult<Book> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.exists_by_title(&request.title).await? {
            return Err(AppError::Conflict(format!(
                "Book '{}' already exists",
                request.title
            )));
        }

        let book = self
            .repository
            .books
            .create(
                &request.title,
                &request.author,
                request.isbn.as_deref(),
                request.total_copies.unwrap_or(1),
            )
            .await?;

        tracing::info!("Book created: {} (id {})", book.title, book.id);
        Ok(book)
    }

    /// Apply a partial update. Changing total_copies does not reconcile
    /// available_copies against active loans; when the new total drops below
    /// the number of borrowed copies this logs a warning and proceeds.
    pub async fn update_book(&self, id: i32, fields: UpdateBook) -> AppResult<Book> {
        fields
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if fields.is_empty() {
            return Err(AppError::Validation(
                "At least one field must be provided".to_string(),
            ));
        }

        if let Some(new_total) = fields.total_copies {
            let current = self.repository.books.get_by_id(id).await?;
            let borrowed = current.total_copies - current.available_copies;
            if new_total < borrowed {
                tracing::warn!(
                    book_id = id,
                    new_total,
                    borrowed,
                    "total_copies lowered below the number of borrowed copies; \
                     available_copies may now exceed total_copies"
                );
            }
        }

        let book = self.repository.books.update(id, &fields).await?;
        tracing::info!("Book updated: {} (id {})", book.title, book.id);
        Ok(book)
    }

    /// Delete a book and, by cascade, its entire loan history
    pub async fn delete_book(&self, id: i32) -> AppResult<String> {
        let title = self.repository.books.delete(id).await?;
        tracing::info!("Book deleted: {} (id {})", title, id);
        Ok(title)
    }
}
