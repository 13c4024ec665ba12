pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Initialize tracing, migrate the database and serve the API.
pub async fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir).expect("Cannot create application data directory");

    let db_path = config::database_path();
    // Run migrations once at startup; request handlers open plain connections.
    db::open_database(&db_path).expect("Cannot open database");

    let ctx = api::ApiContext::new(db_path);
    let app = api::api_router(ctx);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Cannot bind API listener");
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await.expect("API server failed");
}
