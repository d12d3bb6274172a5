//! Idempotent startup seeding.
//!
//! Runs once at startup, after migrations and before the listener binds.
//! The check and the inserts share one transaction, so concurrent starts
//! cannot double-seed and no per-request initialization check exists.

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};

use crate::error::AppResult;

const SAMPLE_BOOKS: &[(&str, &str, &str, i32)] = &[
    ("Don Quijote", "Miguel de Cervantes", "978-84-376-0494-1", 5),
    ("1984", "George Orwell", "978-0451524935", 3),
    ("El Gran Gatsby", "F. Scott Fitzgerald", "978-0743273565", 4),
    ("Orgullo y Prejuicio", "Jane Austen", "978-0141439518", 2),
    ("El Código Da Vinci", "Dan Brown", "978-0307474278", 3),
    ("Harry Potter", "J.K. Rowling", "978-0747532699", 5),
    ("Cien años de soledad", "Gabriel García Márquez", "978-0-06-088328-7", 2),
    ("Fahrenheit 451", "Ray Bradbury", "978-1451673265", 3),
];

/// Sample loans: book title, borrower, e-mail, days since loan, days until due.
const SAMPLE_LOANS: &[(&str, &str, &str, i64, i64)] = &[
    ("Don Quijote", "Juan Pérez", "juan@example.com", 10, 4),
    ("1984", "María García", "maria@example.com", 5, 9),
];

/// Seed sample books and loans when the catalog is empty.
pub async fn seed_sample_data(pool: &Pool<Postgres>) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&mut *tx)
        .await?;

    if existing > 0 {
        tracing::debug!("Catalog already has {} books, skipping seed", existing);
        return Ok(());
    }

    for (title, author, isbn, copies) in SAMPLE_BOOKS {
        sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(copies)
        .execute(&mut *tx)
        .await?;
    }

    let now = Utc::now();
    for (title, name, email, days_ago, days_left) in SAMPLE_LOANS {
        let book_id: i32 = sqlx::query_scalar("SELECT id FROM books WHERE title = $1")
            .bind(title)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO loans (book_id, borrower_name, borrower_email, loan_date, due_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(book_id)
        .bind(name)
        .bind(email)
        .bind(now - Duration::days(*days_ago))
        .bind(now + Duration::days(*days_left))
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Seeded {} sample books and {} sample loans",
        SAMPLE_BOOKS.len(),
        SAMPLE_LOANS.len()
    );
    Ok(())
}
