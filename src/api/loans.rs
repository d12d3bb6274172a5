//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, LoanDetails, ReturnReceipt},
};

/// Loan list filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoanListQuery {
    /// Only return loans that have not been returned yet
    #[serde(default)]
    pub active: bool,
}

/// List response wrapper
#[derive(Serialize, ToSchema)]
pub struct LoanListResponse {
    /// Total number of loans in the response
    pub total: usize,
    pub loans: Vec<LoanDetails>,
}

/// Loans for one borrower
#[derive(Serialize, ToSchema)]
pub struct BorrowerLoansResponse {
    pub total: usize,
    pub borrower_email: String,
    pub loans: Vec<LoanDetails>,
}

/// List loans, optionally only active ones
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanListQuery),
    responses(
        (status = 200, description = "List of loans", body = LoanListResponse)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanListQuery>,
) -> AppResult<Json<LoanListResponse>> {
    let loans = state.services.lending.list_loans(query.active).await?;
    Ok(Json(LoanListResponse {
        total: loans.len(),
        loans,
    }))
}

/// Borrow a book (create a loan)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state.services.lending.borrow(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned, late fee reported", body = ReturnReceipt),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<ReturnReceipt>> {
    let receipt = state.services.lending.return_loan(loan_id).await?;
    Ok(Json(receipt))
}

/// Get all loans for a borrower. Responds 404 when the borrower has no
/// loans at all.
#[utoipa::path(
    get,
    path = "/loans/borrower/{email}",
    tag = "loans",
    params(
        ("email" = String, Path, description = "Borrower e-mail address")
    ),
    responses(
        (status = 200, description = "Borrower's loans", body = BorrowerLoansResponse),
        (status = 404, description = "No loans for this borrower")
    )
)]
pub async fn borrower_loans(
    State(state): State<crate::AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<BorrowerLoansResponse>> {
    let loans = state.services.lending.loans_for_borrower(&email).await?;
    Ok(Json(BorrowerLoansResponse {
        total: loans.len(),
        borrower_email: email,
        loans,
    }))
}
