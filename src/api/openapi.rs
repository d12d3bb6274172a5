//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Booklend API",
        version = "1.0.0",
        description = "Library Book Lending Service REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::service_info,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::list_loans,
        loans::create_loan,
        loans::return_loan,
        loans::borrower_loans,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BookListResponse,
            books::DeleteResponse,
            // Loans
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::ReturnReceipt,
            loans::LoanListResponse,
            loans::BorrowerLoansResponse,
            // Stats
            crate::services::stats::LibraryStats,
            // Health
            health::HealthResponse,
            health::ServiceInfoResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check and service info"),
        (name = "books", description = "Book catalog management"),
        (name = "loans", description = "Loan management"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
