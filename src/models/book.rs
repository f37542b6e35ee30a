//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub category: String,
    pub summary: String,
    pub published_year: Option<i32>,
    pub isbn: String,
    /// Number of times this title has been borrowed. Derived statistic,
    /// incremented once per successful borrow.
    pub borrow_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update book payload. All optional so missing required fields can
/// be reported with a message instead of a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub published_year: Option<i32>,
    pub isbn: Option<String>,
}

/// Validated book fields ready for storage
#[derive(Debug, Clone)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub category: String,
    pub summary: String,
    pub published_year: Option<i32>,
    pub isbn: String,
}

impl BookPayload {
    /// Validate required fields; summary and isbn default to empty strings.
    pub fn into_fields(self) -> Result<BookFields, String> {
        let title = self.title.unwrap_or_default();
        let author = self.author.unwrap_or_default();
        let category = self.category.unwrap_or_default();
        if title.trim().is_empty() || author.trim().is_empty() || category.trim().is_empty() {
            return Err("Title, author, and category are required".to_string());
        }
        Ok(BookFields {
            title,
            author,
            category,
            summary: self.summary.unwrap_or_default(),
            published_year: self.published_year,
            isbn: self.isbn.unwrap_or_default(),
        })
    }
}
