use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aws_clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod models;
mod pagination;
mod render;
mod repositories;
mod routes;
mod startup;

use crate::aws_clients::{create_dynamodb_client, create_sdk_config};
use crate::config::Config;
use crate::domain::{BookmarkRepository, ForumRpc, SessionStore};
use crate::errors::AppError;
use crate::repositories::{DynamoDbBookmarkRepository, DynamoDbForumRpc, DynamoDbSessionStore};

/// AppState holds shared resources for the web server. The domain traits are
/// held as objects so handlers never see the concrete backend.
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub forum_rpc: Arc<dyn ForumRpc>,
    pub login_url: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "forum_bookmarks=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Config::load()?;
    tracing::info!(?config, "Configuration loaded");

    // --- AWS Client Initialization ---
    tracing::info!("Initializing AWS DynamoDB client...");
    let sdk_config = create_sdk_config(&config).await?;
    let db_client = create_dynamodb_client(&sdk_config);

    // --- Resource Creation ---
    startup::init_tables(&db_client).await?;

    // --- Application State ---
    let state = Arc::new(AppState {
        sessions: Arc::new(DynamoDbSessionStore::new(db_client.clone())),
        bookmarks: Arc::new(DynamoDbBookmarkRepository::new(db_client.clone())),
        forum_rpc: Arc::new(DynamoDbForumRpc::new(db_client)),
        login_url: config.login_url.clone(),
    });

    // --- Router Definition ---
    let app = routes::create_router(state);

    // --- Server Startup ---
    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?; // Use ? with From<std::io::Error>
    axum::serve(listener, app).await?;

    Ok(())
}
