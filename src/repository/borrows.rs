//! Borrowed-books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowRecord, BorrowStatus, NewBorrow},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a borrow record by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrowed_books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Borrowed book record not found".to_string()))
    }

    /// Find the active (borrowed or overdue) record for a book, if any
    pub async fn find_active_by_book(&self, book_id: &str) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrowed_books WHERE book_id = $1 AND status IN ('borrowed', 'overdue')",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Insert a new borrow record with status `borrowed`.
    ///
    /// The partial unique index on active records turns a lost
    /// check-then-insert race into a Conflict instead of a second active
    /// loan for the same title.
    pub async fn insert(&self, borrow: &NewBorrow) -> AppResult<Uuid> {
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO borrowed_books
                (book_id, book_title, book_author, user_name, user_email,
                 borrow_date, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'borrowed')
            RETURNING id
            "#,
        )
        .bind(&borrow.book_id)
        .bind(&borrow.book_title)
        .bind(&borrow.book_author)
        .bind(&borrow.user_name)
        .bind(&borrow.user_email)
        .bind(borrow.borrow_date)
        .bind(borrow.due_date)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                "This book is currently held by another borrower".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// List all borrow records, most recent borrow first
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrowed_books ORDER BY borrow_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Persist the borrowed -> overdue transition for a batch of records
    pub async fn mark_overdue(&self, ids: &[Uuid], now: DateTime<Utc>) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "UPDATE borrowed_books SET status = 'overdue', updated_at = $1 WHERE id = ANY($2) AND status = 'borrowed'",
        )
        .bind(now)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark a record returned, stamping return_date and updated_at
    pub async fn mark_returned(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE borrowed_books
            SET status = $1, return_date = $2, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(BorrowStatus::Returned)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal("Failed to update borrowed book record".to_string()));
        }
        Ok(())
    }

    /// Count active (borrowed or overdue) loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowed_books WHERE status IN ('borrowed', 'overdue')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
