//! Dashboard statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::Book, user::DirectoryUser},
    policy,
};

use super::AuthenticatedUser;

/// Top-level counts for the admin dashboard
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub total_books: i64,
    pub total_users: i64,
    pub total_admins: i64,
    pub total_members: i64,
}

/// One slice of the category distribution
#[derive(Serialize, Clone, ToSchema)]
pub struct CategoryStat {
    pub name: String,
    pub value: i64,
}

/// Books added in one month
#[derive(Serialize, ToSchema)]
pub struct MonthlyStat {
    /// Month label, e.g. "Jan 2026"
    pub month: String,
    pub books: i64,
}

/// Recent catalog additions and registrations
#[derive(Serialize, ToSchema)]
pub struct RecentActivity {
    pub books: Vec<Book>,
    pub users: Vec<DirectoryUser>,
}

/// Admin dashboard analytics payload
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub overview: AnalyticsOverview,
    pub category_stats: Vec<CategoryStat>,
    pub monthly_stats: Vec<MonthlyStat>,
    pub top_categories: Vec<CategoryStat>,
    pub recent_activity: RecentActivity,
}

/// Analytics response wrapper
#[derive(Serialize, ToSchema)]
pub struct AnalyticsResponse {
    pub data: AnalyticsData,
}

/// Owner dashboard totals
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerStats {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_books: i64,
    pub total_borrows: i64,
}

/// Owner stats response wrapper
#[derive(Serialize, ToSchema)]
pub struct OwnerStatsResponse {
    pub stats: OwnerStats,
}

/// Get admin dashboard analytics
#[utoipa::path(
    get,
    path = "/analytics",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard analytics", body = AnalyticsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn analytics(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<AnalyticsResponse>> {
    policy::require_admin(&principal)?;

    let data = state.services.stats.analytics().await?;
    Ok(Json(AnalyticsResponse { data }))
}

/// Get owner dashboard totals
#[utoipa::path(
    get,
    path = "/owner/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner dashboard totals", body = OwnerStatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn owner_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<OwnerStatsResponse>> {
    policy::require_admin(&principal)?;

    let stats = state.services.stats.owner_stats().await?;
    Ok(Json(OwnerStatsResponse { stats }))
}
