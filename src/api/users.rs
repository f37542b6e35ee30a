//! User directory and role management endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{AssignableRole, DirectoryUser, Role},
    policy,
};

use super::AuthenticatedUser;

/// Per-role user counts
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: i64,
    pub regular_users: i64,
    pub admins: i64,
    pub owners: i64,
}

/// User directory response
#[derive(Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<DirectoryUser>,
    pub stats: UserStats,
}

/// Role change request. Fields are optional so missing ones produce a 400
/// with a message rather than a body rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// Role change response
#[derive(Serialize, ToSchema)]
pub struct ChangeRoleResponse {
    pub message: String,
}

/// List all users with roles and counts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users, newest first", body = UsersResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<UsersResponse>> {
    policy::require_admin(&principal)?;

    let (users, counts) = state.services.directory.list_users().await?;

    Ok(Json(UsersResponse {
        users,
        stats: UserStats {
            total: counts.total,
            regular_users: counts.regular_users,
            admins: counts.admins,
            owners: counts.owners,
        },
    }))
}

/// Change a user's role (owner only)
#[utoipa::path(
    post,
    path = "/owner/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ChangeRoleResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owner access required, or target is an owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(request): Json<ChangeRoleRequest>,
) -> AppResult<Json<ChangeRoleResponse>> {
    policy::require_owner(&principal)?;

    let (user_id, role) = match (request.user_id, request.role) {
        (Some(id), Some(role)) if !id.is_empty() && !role.is_empty() => (id, role),
        _ => {
            return Err(AppError::Validation(
                "User ID and role are required".to_string(),
            ))
        }
    };

    let user_id = Uuid::parse_str(&user_id)
        .map_err(|_| AppError::Validation("Invalid user ID".to_string()))?;
    let new_role: AssignableRole = role
        .parse()
        .map_err(|_| AppError::Validation("Invalid role".to_string()))?;

    state.services.directory.change_role(user_id, new_role).await?;

    Ok(Json(ChangeRoleResponse {
        message: format!("User role updated to {}", Role::from(new_role)),
    }))
}
