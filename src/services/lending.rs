//! Lending ledger service: the loan state machine and late-fee computation.
//!
//! A loan only ever moves Active -> Returned; returning an already-returned
//! loan is rejected with a conflict, never silently ignored.

use chrono::{DateTime, Duration, Utc};
use validator::Validate;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{CreateLoan, LoanDetails, ReturnReceipt},
    repository::Repository,
};

/// Whole days late (floored, never negative) and the resulting fee.
/// The fee is derived at return time and never persisted.
pub fn late_fee(
    due_date: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    fee_rate_per_day: i64,
) -> (i64, i64) {
    let late_days = (returned_at - due_date).num_days().max(0);
    (late_days, late_days * fee_rate_per_day)
}

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    config: LoansConfig,
}

impl LendingService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a copy of a book. Fails with a conflict when no copy is
    /// available; the decrement and the loan insert commit atomically.
    pub async fn borrow(&self, request: CreateLoan) -> AppResult<LoanDetails> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let now = Utc::now();
        let period = request
            .loan_period_days
            .unwrap_or(self.config.default_period_days);
        let due_date = now + Duration::days(period);

        let loan_id = self
            .repository
            .loans
            .create(
                request.book_id,
                &request.borrower_name,
                &request.borrower_email,
                now,
                due_date,
            )
            .await?;

        tracing::info!(
            "Loan created: book {} for {} (loan {})",
            request.book_id,
            request.borrower_name,
            loan_id
        );

        let details = self.repository.loans.get_details(loan_id).await?;
        Ok(details.with_days_remaining(now))
    }

    /// Return a loan: flags it returned, releases the copy, and reports the
    /// late fee.
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<ReturnReceipt> {
        let now = Utc::now();
        let loan = self.repository.loans.mark_returned(loan_id, now).await?;

        let (late_days, fee) = late_fee(loan.due_date, now, self.config.fee_rate_per_day);

        tracing::info!(
            "Loan returned: {} by {} ({} days late)",
            loan.id,
            loan.borrower_name,
            late_days
        );

        let details = self.repository.loans.get_details(loan_id).await?;
        Ok(ReturnReceipt {
            loan: details.with_days_remaining(now),
            late_days,
            fee,
        })
    }

    /// List all loans, or only active ones
    pub async fn list_loans(&self, active_only: bool) -> AppResult<Vec<LoanDetails>> {
        let now = Utc::now();
        let loans = self.repository.loans.list(active_only).await?;
        Ok(loans
            .into_iter()
            .map(|l| l.with_days_remaining(now))
            .collect())
    }

    /// List loans for a borrower. A borrower with no loans at all is
    /// reported as not found rather than as an empty list.
    pub async fn loans_for_borrower(&self, email: &str) -> AppResult<Vec<LoanDetails>> {
        let now = Utc::now();
        let loans = self.repository.loans.list_for_borrower(email).await?;
        if loans.is_empty() {
            return Err(AppError::NotFound(format!(
                "No loans found for borrower {}",
                email
            )));
        }
        Ok(loans
            .into_iter()
            .map(|l| l.with_days_remaining(now))
            .collect())
    }
}
