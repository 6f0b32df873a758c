//! PeopleSearch Backend
//!
//! A REST backend for a personnel directory: person CRUD driven by a flat
//! change-list protocol, per-session interest diff tracking, and a
//! reference-counted image store, all persisted in SQLite.

mod api;
mod changes;
mod config;
mod db;
mod errors;
mod interests;
mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PeopleSearch Backend");
    tracing::info!("People database path: {:?}", config.people_db_path);
    tracing::info!("Image database path: {:?}", config.image_db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize databases
    let people_pool = db::init_people_database(&config.people_db_path).await?;
    let image_pool = db::init_image_database(&config.image_db_path).await?;
    let repo = Arc::new(Repository::new(people_pool, image_pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // People
        .route("/people", get(api::list_people))
        .route("/people", post(api::create_person))
        .route("/people/{id}", get(api::get_person))
        .route("/people/{id}", put(api::update_person))
        .route("/people/{id}", delete(api::delete_person))
        // Images
        .route("/image", get(api::get_image))
        .route("/image", post(api::upload_image))
        .route("/image", delete(api::delete_image));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
