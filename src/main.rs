//! Libris Server - Library Management System
//!
//! REST API server for circulation, catalog and reader management.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), config.email.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS: the access token travels in a cookie, so credentials must be
    // allowed and the origin pinned to the configured frontend
    let origin = state
        .config
        .server
        .cors_origin
        .parse::<HeaderValue>()
        .expect("Invalid CORS origin");
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        .route("/auth/password", put(api::auth::change_password))
        .route("/reader-auth/login", post(api::auth::login_reader))
        .route("/reader-auth/signup", post(api::auth::signup_reader))
        // Readers
        .route("/readers", get(api::readers::list_readers))
        .route("/readers", post(api::readers::create_reader))
        .route("/readers/:id", get(api::readers::get_reader))
        .route("/readers/:id", put(api::readers::update_reader))
        .route("/readers/:id", delete(api::readers::delete_reader))
        .route("/readers/:id/status", put(api::readers::verify_reader))
        .route("/user-types", get(api::readers::list_user_types))
        .route("/user-types", post(api::readers::create_user_type))
        .route("/user-types/:id", put(api::readers::update_user_type))
        .route("/user-types/:id", delete(api::readers::delete_user_type))
        // Staff
        .route("/staff", get(api::staff::list_staff))
        .route("/staff", post(api::staff::create_staff))
        .route("/staff/:id", get(api::staff::get_staff))
        .route("/staff/:id", delete(api::staff::delete_staff))
        .route("/staff-types", get(api::staff::list_staff_types))
        .route("/staff-types", post(api::staff::create_staff_type))
        .route("/staff-types/:id", put(api::staff::update_staff_type))
        .route("/staff-types/:id", delete(api::staff::delete_staff_type))
        // Resources (catalog)
        .route("/resources", get(api::resources::list_resources))
        .route("/resources", post(api::resources::create_resource))
        .route("/resources/:id", get(api::resources::get_resource))
        .route("/resources/:id", put(api::resources::update_resource))
        .route("/resources/:id", delete(api::resources::delete_resource))
        .route("/resources/:id/history", get(api::loans::get_resource_history))
        .route("/resources/:id/comments", get(api::comments::list_comments))
        .route("/resource-types", get(api::resources::list_resource_types))
        .route("/resource-types", post(api::resources::create_resource_type))
        .route("/resource-types/:id", put(api::resources::update_resource_type))
        .route("/resource-types/:id", delete(api::resources::delete_resource_type))
        // Circulation
        .route("/transactions", get(api::loans::list_transactions))
        .route("/transactions", post(api::loans::create_loan))
        .route("/transactions/:id", put(api::loans::transition_loan))
        .route("/transactions/:id", delete(api::loans::delete_loan))
        .route("/late", get(api::loans::list_late))
        .route("/late/sweep", post(api::loans::sweep_late))
        .route("/late/notices", post(api::loans::send_late_notices))
        .route("/users/:id/history", get(api::loans::get_user_history))
        // Comments
        .route("/comments", post(api::comments::create_comment))
        .route("/comments/:id", delete(api::comments::delete_comment))
        // Suggestions
        .route("/suggestions", get(api::suggestions::list_suggestions))
        .route("/suggestions", post(api::suggestions::create_suggestion))
        .route("/suggestions/:id", delete(api::suggestions::delete_suggestion))
        // Audit trail
        .route("/logs", get(api::logs::list_logs))
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .route("/stats/monthly", get(api::stats::monthly_borrows))
        .route("/stats/most-borrowed", get(api::stats::most_borrowed))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
