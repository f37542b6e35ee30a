//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librarium API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::borrow_book,
        borrows::list_borrowed,
        borrows::return_book,
        // Users
        users::list_users,
        users::change_role,
        // Stats
        stats::analytics,
        stats::owner_stats,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::UserInfo,
            auth::RegisterResponse,
            auth::LoginResponse,
            auth::MeResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookPayload,
            books::BooksResponse,
            books::CreateBookResponse,
            books::MessageResponse,
            // Borrows
            crate::models::borrow::BorrowStatus,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRequest,
            crate::models::borrow::ActiveHolder,
            crate::models::borrow::BorrowAvailability,
            borrows::BorrowResponse,
            borrows::BorrowListResponse,
            borrows::ReturnResponse,
            // Users
            crate::models::user::Role,
            crate::models::user::AssignableRole,
            crate::models::user::DirectoryUser,
            users::UserStats,
            users::UsersResponse,
            users::ChangeRoleRequest,
            users::ChangeRoleResponse,
            // Stats
            stats::AnalyticsOverview,
            stats::CategoryStat,
            stats::MonthlyStat,
            stats::RecentActivity,
            stats::AnalyticsData,
            stats::AnalyticsResponse,
            stats::OwnerStats,
            stats::OwnerStatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "borrows", description = "Borrow lifecycle"),
        (name = "users", description = "User directory and roles"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
