//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub borrower_name: String,
    pub borrower_email: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub returned: bool,
}

/// Loan with the referenced book's title and derived days-remaining,
/// the shape returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub borrower_name: String,
    pub borrower_email: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub returned: bool,
    /// Whole days until the due date; 0 once the loan is returned
    #[sqlx(skip)]
    pub days_remaining: i64,
}

impl LoanDetails {
    /// Fill in `days_remaining` relative to `now`.
    pub fn with_days_remaining(mut self, now: DateTime<Utc>) -> Self {
        self.days_remaining = if self.returned {
            0
        } else {
            (self.due_date - now).num_days()
        };
        self
    }
}

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    pub book_id: i32,
    #[validate(length(min = 1, max = 100, message = "borrower_name is required"))]
    pub borrower_name: String,
    #[validate(email(message = "borrower_email must be a valid e-mail address"))]
    pub borrower_email: String,
    /// Loan duration in days; defaults to the configured loan period
    #[validate(range(min = 1))]
    pub loan_period_days: Option<i64>,
}

/// Result of returning a loan. The fee is derived at return time and never
/// persisted.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnReceipt {
    pub loan: LoanDetails,
    /// Whole days past the due date (0 when returned on time)
    pub late_days: i64,
    /// late_days * fee_rate_per_day, in currency units
    pub fee: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn details(due: DateTime<Utc>, returned: bool) -> LoanDetails {
        LoanDetails {
            id: 1,
            book_id: 1,
            book_title: "1984".to_string(),
            borrower_name: "Ana".to_string(),
            borrower_email: "ana@x.com".to_string(),
            loan_date: due - Duration::days(14),
            due_date: due,
            returned_date: returned.then(|| due - Duration::days(1)),
            returned,
            days_remaining: 0,
        }
    }

    #[test]
    fn days_remaining_counts_down_to_due() {
        let now = Utc::now();
        let loan = details(now + Duration::days(4), false).with_days_remaining(now);
        assert_eq!(loan.days_remaining, 4);
    }

    #[test]
    fn days_remaining_is_zero_once_returned() {
        let now = Utc::now();
        let loan = details(now + Duration::days(4), true).with_days_remaining(now);
        assert_eq!(loan.days_remaining, 0);
    }
}
