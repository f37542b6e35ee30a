//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, RegisterRequest, UserInfo},
};

use super::AuthenticatedUser;

/// Registration response
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserInfo,
}

/// Login response with issued token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserInfo,
    pub token: String,
}

/// Current principal response
#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserInfo,
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.services.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserInfo::from(&user),
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state.services.auth.login(request).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: UserInfo::from(&user),
        token,
    }))
}

/// Get the authenticated caller
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedUser(principal): AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserInfo {
            id: principal.id,
            email: principal.email,
            name: principal.name,
            is_admin: principal.role.is_admin(),
            is_owner: principal.role.is_owner(),
        },
    })
}
