//! Borrow record model and loan lifecycle state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a loan.
///
/// Transitions: `Borrowed -> Overdue` happens lazily whenever records are
/// listed (no background timer); `Borrowed | Overdue -> Returned` happens on
/// an explicit return. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Overdue,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Overdue => "overdue",
            BorrowStatus::Returned => "returned",
        }
    }

    /// An active loan blocks further borrows of the same title.
    pub fn is_active(&self) -> bool {
        matches!(self, BorrowStatus::Borrowed | BorrowStatus::Overdue)
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrowed" => Ok(BorrowStatus::Borrowed),
            "overdue" => Ok(BorrowStatus::Overdue),
            "returned" => Ok(BorrowStatus::Returned),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// SQLx conversion for BorrowStatus (stored as text)
impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Compute the effective status of a loan at `now`.
///
/// Both the single-book availability probe and the full listing go through
/// this one function so the two paths cannot disagree on what "overdue"
/// means. Persisting the transition is the caller's concern.
pub fn derive_status(status: BorrowStatus, due_date: DateTime<Utc>, now: DateTime<Utc>) -> BorrowStatus {
    match status {
        BorrowStatus::Borrowed if due_date < now => BorrowStatus::Overdue,
        other => other,
    }
}

/// Borrow record from database.
///
/// `book_id` is a loose text reference, and title/author/borrower fields are
/// snapshots taken at borrow time; the record stays meaningful even if the
/// book is later edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: Uuid,
    pub book_id: String,
    pub book_title: String,
    pub book_author: String,
    pub user_name: String,
    pub user_email: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: BorrowStatus,
    pub return_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Borrow request body. Fields are optional so that missing ones produce a
/// 400 with a message rather than a body rejection; the email may also be
/// resolved from the caller's session.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: Option<String>,
    pub book_title: Option<String>,
    pub book_author: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Validated borrow fields ready for insertion
#[derive(Debug, Clone)]
pub struct NewBorrow {
    pub book_id: String,
    pub book_title: String,
    pub book_author: String,
    pub user_name: String,
    pub user_email: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Current holder of a book, as exposed by the availability probe
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveHolder {
    pub name: String,
    pub email: String,
    pub due_date: DateTime<Utc>,
    pub status: BorrowStatus,
}

/// Availability projection for a single book
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowAvailability {
    pub borrowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<ActiveHolder>,
}
