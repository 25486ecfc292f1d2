//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, comments, health, loans, logs, readers, resources, staff, stats, suggestions,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::login_reader,
        auth::signup_reader,
        auth::logout,
        auth::me,
        auth::update_profile,
        auth::change_password,
        // Readers
        readers::list_readers,
        readers::get_reader,
        readers::create_reader,
        readers::update_reader,
        readers::verify_reader,
        readers::delete_reader,
        readers::list_user_types,
        readers::create_user_type,
        readers::update_user_type,
        readers::delete_user_type,
        // Staff
        staff::list_staff,
        staff::get_staff,
        staff::create_staff,
        staff::delete_staff,
        staff::list_staff_types,
        staff::create_staff_type,
        staff::update_staff_type,
        staff::delete_staff_type,
        // Resources
        resources::list_resources,
        resources::get_resource,
        resources::create_resource,
        resources::update_resource,
        resources::delete_resource,
        resources::list_resource_types,
        resources::create_resource_type,
        resources::update_resource_type,
        resources::delete_resource_type,
        // Loans
        loans::list_transactions,
        loans::create_loan,
        loans::transition_loan,
        loans::delete_loan,
        loans::list_late,
        loans::sweep_late,
        loans::send_late_notices,
        loans::get_user_history,
        loans::get_resource_history,
        // Comments
        comments::list_comments,
        comments::create_comment,
        comments::delete_comment,
        // Suggestions
        suggestions::list_suggestions,
        suggestions::create_suggestion,
        suggestions::delete_suggestion,
        // Logs
        logs::list_logs,
        // Stats
        stats::get_stats,
        stats::monthly_borrows,
        stats::most_borrowed,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionUser,
            // Readers
            crate::models::user::User,
            crate::models::user::UserWithType,
            crate::models::user::UserType,
            crate::models::user::UserTypePayload,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            readers::MessageResponse,
            // Staff
            crate::models::staff::Staff,
            crate::models::staff::StaffType,
            crate::models::staff::StaffTypePayload,
            crate::models::staff::CreateStaff,
            crate::models::staff::UpdateProfile,
            crate::models::staff::ChangePassword,
            // Resources
            crate::models::resource::Resource,
            crate::models::resource::ResourceWithType,
            crate::models::resource::ResourceType,
            crate::models::resource::ResourceTypePayload,
            crate::models::resource::CreateResource,
            crate::models::resource::UpdateResource,
            crate::models::resource::MostBorrowedResource,
            // Loans
            loans::CreateLoanRequest,
            loans::TransitionRequest,
            loans::LoanResponse,
            loans::SweepResponse,
            loans::LateNoticeRequest,
            crate::models::reservation::Reservation,
            crate::models::reservation::TransactionView,
            crate::models::reservation::LoanView,
            crate::services::email::NoticeSummary,
            // Comments
            crate::models::comment::Comment,
            crate::models::comment::CommentWithAuthor,
            crate::models::comment::CreateComment,
            // Suggestions
            crate::models::suggestion::Suggestion,
            crate::models::suggestion::CreateSuggestion,
            // Logs
            crate::models::audit::AuditLog,
            // Stats
            crate::services::stats::Stats,
            crate::services::stats::MonthlyBorrows,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "readers", description = "Reader management"),
        (name = "staff", description = "Staff management"),
        (name = "resources", description = "Catalog management"),
        (name = "loans", description = "Circulation lifecycle"),
        (name = "comments", description = "Reader comments and ratings"),
        (name = "suggestions", description = "Acquisition suggestions"),
        (name = "logs", description = "Audit trail"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
