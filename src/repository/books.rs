//! Books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFields},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Create a new book, returning its id
    pub async fn create(&self, fields: &BookFields) -> AppResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO books (title, author, category, summary, published_year, isbn, borrow_count)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            RETURNING id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(&fields.category)
        .bind(&fields.summary)
        .bind(fields.published_year)
        .bind(&fields.isbn)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Update an existing book
    pub async fn update(&self, id: Uuid, fields: &BookFields) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author = $2, category = $3, summary = $4,
                published_year = $5, isbn = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(&fields.category)
        .bind(&fields.summary)
        .bind(fields.published_year)
        .bind(&fields.isbn)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }

    /// Hard-delete a book
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }

    /// Look up a book by a loosely-typed id: a well-formed UUID matches the
    /// primary key directly, anything else falls back to a textual match
    /// (historical records may carry string ids).
    pub async fn find_by_loose_id(&self, book_id: &str) -> AppResult<Option<Book>> {
        let book = match Uuid::parse_str(book_id) {
            Ok(id) => {
                sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            Err(_) => {
                sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id::text = $1")
                    .bind(book_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(book)
    }

    /// Bump the borrow counter by one and stamp updated_at
    pub async fn increment_borrow_count(&self, book_id: &str) -> AppResult<()> {
        let result = match Uuid::parse_str(book_id) {
            Ok(id) => {
                sqlx::query("UPDATE books SET borrow_count = borrow_count + 1, updated_at = NOW() WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            Err(_) => {
                sqlx::query("UPDATE books SET borrow_count = borrow_count + 1, updated_at = NOW() WHERE id::text = $1")
                    .bind(book_id)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of books per category, largest first
    pub async fn category_counts(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) as count FROM books GROUP BY category ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("category"), row.get("count")))
            .collect())
    }

    /// Books added per month since the given date
    pub async fn monthly_additions(&self, since: DateTime<Utc>) -> AppResult<Vec<(DateTime<Utc>, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT date_trunc('month', created_at) as month, COUNT(*) as count
            FROM books
            WHERE created_at >= $1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("month"), row.get("count")))
            .collect())
    }

    /// Most recently added books
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}
