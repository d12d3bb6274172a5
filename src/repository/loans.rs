//! Loans repository for database operations.
//!
//! Borrow and return each run in a single transaction so the copy-count and
//! returned-flag invariants are never observable half-applied: borrow uses a
//! conditional decrement (two concurrent borrows of a last copy yield exactly
//! one success), return locks the loan row with FOR UPDATE.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails},
};

const LOAN_DETAILS_SELECT: &str = r#"
    SELECT l.id, l.book_id, b.title AS book_title, l.borrower_name,
           l.borrower_email, l.loan_date, l.due_date, l.returned_date, l.returned
    FROM loans l
    JOIN books b ON b.id = l.book_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan details by ID
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE l.id = $1", LOAN_DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List all loans, or only those not yet returned
    pub async fn list(&self, active_only: bool) -> AppResult<Vec<LoanDetails>> {
        let query = if active_only {
            format!("{} WHERE NOT l.returned ORDER BY l.id", LOAN_DETAILS_SELECT)
        } else {
            format!("{} ORDER BY l.id", LOAN_DETAILS_SELECT)
        };
        let loans = sqlx::query_as::<_, LoanDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// List loans whose borrower e-mail matches
    pub async fn list_for_borrower(&self, email: &str) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE l.borrower_email = $1 ORDER BY l.id",
            LOAN_DETAILS_SELECT
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Create a loan, decrementing the book's availability in the same
    /// transaction. The conditional UPDATE both checks and claims the copy.
    pub async fn create(
        &self,
        book_id: i32,
        borrower_name: &str,
        borrower_email: &str,
        loan_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1
             WHERE id = $1 AND available_copies > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            // Distinguish a missing book from an out-of-stock one.
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                AppError::Conflict("No copies available".to_string())
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }

        let loan_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO loans (book_id, borrower_name, borrower_email, loan_date, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(borrower_name)
        .bind(borrower_email)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan_id)
    }

    /// Mark a loan returned and release its copy, atomically. Rejects a loan
    /// that is already returned; the FOR UPDATE lock makes the check safe
    /// against a concurrent return of the same loan.
    pub async fn mark_returned(&self, loan_id: i32, returned_date: DateTime<Utc>) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.returned {
            return Err(AppError::Conflict("Loan already returned".to_string()));
        }

        sqlx::query("UPDATE loans SET returned = TRUE, returned_date = $2 WHERE id = $1")
            .bind(loan_id)
            .bind(returned_date)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Loan {
            returned: true,
            returned_date: Some(returned_date),
            ..loan
        })
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE NOT returned")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count active loans past their due date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE NOT returned AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
