use tracing_subscriber::EnvFilter;

use polls_api::api::{self, AppState};
use polls_api::bootstrap::ensure_admin;
use polls_api::config::Config;
use polls_api::infrastructure::Database;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("polls_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    tracing::info!("Database connected successfully");

    if let Some(admin) = &config.admin {
        ensure_admin(&db, admin)
            .await
            .expect("Failed to create admin user");
    }

    let addr = config.bind_addr;
    let app = api::router(AppState::new(db, config));

    // Start server
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
