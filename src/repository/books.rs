//! Books repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, UpdateBook},
};

/// Columns selected for every book read; `active_loans` is derived on demand
/// rather than cached on the row.
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.isbn, b.total_copies, b.available_copies,
           b.created_at,
           (SELECT COUNT(*) FROM loans l
             WHERE l.book_id = b.id AND NOT l.returned) AS active_loans
    FROM books b
"#;

fn conflict_on_unique(e: sqlx::Error, message: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(e),
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("{} ORDER BY b.id", BOOK_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Check whether a book with the given title already exists
    pub async fn exists_by_title(&self, title: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE title = $1)")
                .bind(title)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new book; available copies start equal to total copies
    pub async fn create(
        &self,
        title: &str,
        author: &str,
        isbn: Option<&str>,
        total_copies: i32,
    ) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, isbn, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(total_copies)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A book with this title or ISBN already exists"))?;

        self.get_by_id(id).await
    }

    /// Partial update; absent fields are left untouched. Availability is
    /// never adjusted here, even when total_copies changes.
    pub async fn update(&self, id: i32, fields: &UpdateBook) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                total_copies = COALESCE($5, total_copies)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(fields.title.as_deref())
        .bind(fields.author.as_deref())
        .bind(fields.isbn.as_deref())
        .bind(fields.total_copies)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A book with this title or ISBN already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book. The FK cascade removes its loan history in the same
    /// statement. Returns the deleted title.
    pub async fn delete(&self, id: i32) -> AppResult<String> {
        let row = sqlx::query("DELETE FROM books WHERE id = $1 RETURNING title")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        Ok(row.get("title"))
    }

    /// Catalog totals: (distinct books, sum of total copies, sum of available copies)
    pub async fn totals(&self) -> AppResult<(i64, i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total_books,
                   COALESCE(SUM(total_copies), 0)::bigint AS total_copies,
                   COALESCE(SUM(available_copies), 0)::bigint AS available_copies
            FROM books
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok((
            row.get("total_books"),
            row.get("total_copies"),
            row.get("available_copies"),
        ))
    }
}
