//! Borrow lifecycle service: request, list, return.
//!
//! Loans move `borrowed -> overdue` lazily when the collection is listed
//! (staleness is bounded by how recently someone looked), and
//! `borrowed | overdue -> returned` on an explicit return action.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{
            derive_status, ActiveHolder, BorrowAvailability, BorrowRecord, BorrowRequest,
            BorrowStatus, NewBorrow,
        },
        user::Principal,
    },
    policy,
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Request a borrow for a book.
    ///
    /// The borrower email comes from the request body when present,
    /// otherwise from the caller's session. Returns the new record's id and
    /// the due date.
    pub async fn request_borrow(
        &self,
        request: BorrowRequest,
        session: Option<&Principal>,
    ) -> AppResult<(Uuid, DateTime<Utc>)> {
        let (book_id, book_title, book_author, user_name, borrow_date, due_date) = match (
            request.book_id,
            request.book_title,
            request.book_author,
            request.user_name,
            request.borrow_date,
            request.due_date,
        ) {
            (Some(id), Some(title), Some(author), Some(name), Some(from), Some(until))
                if !id.is_empty() && !title.is_empty() && !author.is_empty() && !name.is_empty() =>
            {
                (id, title, author, name, from, until)
            }
            _ => return Err(AppError::Validation("Missing required fields".to_string())),
        };

        let user_email = match request.user_email.filter(|e| !e.trim().is_empty()) {
            Some(email) => email,
            None => policy::require_authenticated(session)
                .map_err(|_| {
                    AppError::Authentication("Authentication required to borrow a book".to_string())
                })?
                .email
                .clone(),
        };

        if !user_email.validate_email() {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }
        let user_email = user_email.trim().to_lowercase();

        // Single copy per title: one active loan at a time
        if let Some(active) = self.repository.borrows.find_active_by_book(&book_id).await? {
            if active.user_email.to_lowercase() == user_email {
                return Err(AppError::Conflict(
                    "This book is already borrowed by you".to_string(),
                ));
            }
            return Err(AppError::Conflict(
                "This book is currently held by another borrower".to_string(),
            ));
        }

        self.repository
            .books
            .find_by_loose_id(&book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        let borrow = NewBorrow {
            book_id: book_id.clone(),
            book_title,
            book_author,
            user_name: user_name.trim().to_string(),
            user_email,
            borrow_date,
            due_date,
        };

        let borrow_id = self.repository.borrows.insert(&borrow).await?;

        // Best-effort counter: the inserted record is the source of truth,
        // a failed increment must not fail the borrow.
        if let Err(e) = self.repository.books.increment_borrow_count(&book_id).await {
            tracing::warn!("Failed to update borrow count for book {}: {}", book_id, e);
        }

        Ok((borrow_id, due_date))
    }

    /// Availability projection for a single book. Status is recomputed in
    /// the response but the transition is not persisted on this path.
    pub async fn availability(&self, book_id: &str) -> AppResult<BorrowAvailability> {
        let now = Utc::now();
        let active = self.repository.borrows.find_active_by_book(book_id).await?;

        Ok(match active {
            Some(record) => BorrowAvailability {
                borrowed: true,
                by: Some(ActiveHolder {
                    name: record.user_name,
                    email: record.user_email,
                    due_date: record.due_date,
                    status: derive_status(record.status, record.due_date, now),
                }),
            },
            None => BorrowAvailability {
                borrowed: false,
                by: None,
            },
        })
    }

    /// List all borrow records, newest borrow first, persisting any pending
    /// borrowed -> overdue transitions. This is the only place the lazy
    /// transition is committed to storage.
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        let mut records = self.repository.borrows.list_all().await?;
        let now = Utc::now();

        let mut newly_overdue = Vec::new();
        for record in records.iter_mut() {
            if record.status == BorrowStatus::Borrowed
                && derive_status(record.status, record.due_date, now) == BorrowStatus::Overdue
            {
                newly_overdue.push(record.id);
                record.status = BorrowStatus::Overdue;
                record.updated_at = now;
            }
        }

        self.repository.borrows.mark_overdue(&newly_overdue, now).await?;

        Ok(records)
    }

    /// Mark a borrow record as returned. Rejects a second return: the
    /// record is immutable history once returned.
    pub async fn return_book(&self, borrow_id: Uuid) -> AppResult<DateTime<Utc>> {
        let record = self.repository.borrows.get_by_id(borrow_id).await?;

        if record.status == BorrowStatus::Returned {
            return Err(AppError::InvalidState("Book is already returned".to_string()));
        }

        let now = Utc::now();
        self.repository.borrows.mark_returned(borrow_id, now).await?;

        Ok(now)
    }

    /// Count active loans (for dashboards)
    pub async fn count_active(&self) -> AppResult<i64> {
        self.repository.borrows.count_active().await
    }
}
