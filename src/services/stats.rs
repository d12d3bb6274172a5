//! Library statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Aggregate library statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct LibraryStats {
    /// Number of distinct books in the catalog
    pub total_books: i64,
    /// Sum of total copies across all books
    pub total_copies: i64,
    /// Sum of available copies across all books
    pub available_copies: i64,
    /// total_copies - available_copies
    pub borrowed_copies: i64,
    /// Loans not yet returned
    pub active_loans: i64,
    /// Active loans past their due date
    pub overdue_loans: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_stats(&self) -> AppResult<LibraryStats> {
        let (total_books, total_copies, available_copies) =
            self.repository.books.totals().await?;
        let active_loans = self.repository.loans.count_active().await?;
        let overdue_loans = self.repository.loans.count_overdue().await?;

        Ok(LibraryStats {
            total_books,
            total_copies,
            available_copies,
            borrowed_copies: total_copies - available_copies,
            active_loans,
            overdue_loans,
        })
    }
}
