//! API handlers for the Librarium REST endpoints

pub mod auth;
pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    error::AppError,
    models::user::{Principal, UserClaims},
    AppState,
};

fn principal_from_parts(parts: &Parts, state: &AppState) -> Result<Principal, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::Authentication(
            "Invalid authorization header format".to_string(),
        ));
    }

    let token = &auth_header[7..];

    let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Authentication(e.to_string()))?;

    Principal::from_claims(&claims)
        .ok_or_else(|| AppError::Authentication("Invalid token subject".to_string()))
}

/// Extractor for the authenticated caller. Rejects with 401 when no valid
/// bearer token is present.
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        principal_from_parts(parts, state).map(AuthenticatedUser)
    }
}

/// Extractor for routes where a session is optional (the borrow request can
/// carry the borrower email in its body instead). A missing or invalid
/// token resolves to no principal rather than a rejection.
pub struct OptionalUser(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(principal_from_parts(parts, state).ok()))
    }
}
