//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model (DB + API). Every read is annotated with the number of
/// currently active (unreturned) loans, derived by subquery.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    /// Number of loans on this book with returned = false
    pub active_loans: i64,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "author is required"))]
    pub author: String,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    /// Number of copies (default 1); available copies start equal to this
    #[validate(range(min = 0))]
    pub total_copies: Option<i32>,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "author must not be empty"))]
    pub author: Option<String>,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[validate(range(min = 0))]
    pub total_copies: Option<i32>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.total_copies.is_none()
    }
}
