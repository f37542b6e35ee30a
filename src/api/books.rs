//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, BookPayload},
    policy,
};

use super::AuthenticatedUser;

/// Book listing response
#[derive(Serialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

/// Book creation response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookResponse {
    pub book_id: Uuid,
}

/// Generic message response
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books, newest first", body = BooksResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
) -> AppResult<Json<BooksResponse>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(BooksResponse { books }))
}

/// Add a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = CreateBookResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(payload): Json<BookPayload>,
) -> AppResult<(StatusCode, Json<CreateBookResponse>)> {
    policy::require_admin(&principal)?;

    let book_id = state.services.catalog.create_book(payload).await?;
    Ok((StatusCode::CREATED, Json(CreateBookResponse { book_id })))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Missing required fields"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookPayload>,
) -> AppResult<Json<MessageResponse>> {
    policy::require_admin(&principal)?;

    state.services.catalog.update_book(id, payload).await?;
    Ok(Json(MessageResponse {
        message: "Book updated successfully".to_string(),
    }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    policy::require_admin(&principal)?;

    state.services.catalog.delete_book(id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
