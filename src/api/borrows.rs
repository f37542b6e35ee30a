//! Borrow lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::borrow::{BorrowAvailability, BorrowRecord, BorrowRequest},
};

use super::OptionalUser;

/// Borrow creation response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowResponse {
    pub message: String,
    pub borrow_id: Uuid,
    pub due_date: DateTime<Utc>,
}

/// Query parameters for the borrow listing
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BorrowListQuery {
    /// When set, returns the availability projection for this book only
    pub book_id: Option<String>,
}

/// Borrow listing response: either the full record list or a single-book
/// availability projection
#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum BorrowListResponse {
    #[serde(rename_all = "camelCase")]
    All { borrowed_books: Vec<BorrowRecord> },
    Availability(BorrowAvailability),
}

/// Return confirmation response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResponse {
    pub message: String,
    pub return_date: DateTime<Utc>,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/borrow",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowResponse),
        (status = 400, description = "Missing fields or invalid email"),
        (status = 401, description = "No borrower email and no session"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book already on loan"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    OptionalUser(principal): OptionalUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let (borrow_id, due_date) = state
        .services
        .borrows
        .request_borrow(request, principal.as_ref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            message: "Book borrowed successfully".to_string(),
            borrow_id,
            due_date,
        }),
    ))
}

/// List borrow records, or probe a single book's availability
#[utoipa::path(
    get,
    path = "/books/borrow",
    tag = "borrows",
    params(BorrowListQuery),
    responses(
        (status = 200, description = "Borrow records or availability", body = BorrowListResponse),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_borrowed(
    State(state): State<crate::AppState>,
    Query(query): Query<BorrowListQuery>,
) -> AppResult<Json<BorrowListResponse>> {
    match query.book_id {
        Some(book_id) => {
            let availability = state.services.borrows.availability(&book_id).await?;
            Ok(Json(BorrowListResponse::Availability(availability)))
        }
        None => {
            let borrowed_books = state.services.borrows.list_all().await?;
            Ok(Json(BorrowListResponse::All { borrowed_books }))
        }
    }
}

/// Return a borrowed book.
///
/// No authorization is applied here, matching the observed behavior of the
/// system this replaces; see DESIGN.md for the open question.
#[utoipa::path(
    post,
    path = "/books/return/{id}",
    tag = "borrows",
    params(
        ("id" = Uuid, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Already returned"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(borrow_id): Path<Uuid>,
) -> AppResult<Json<ReturnResponse>> {
    let return_date = state.services.borrows.return_book(borrow_id).await?;

    Ok(Json(ReturnResponse {
        message: "Book marked as returned successfully".to_string(),
        return_date,
    }))
}
