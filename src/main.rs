use edu_marketplace::{
    AppState, CurationService,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Startup order: configuration, logging, database (with migrations), curation service,
/// then the HTTP server. Any failure before `serve` aborts the process.
#[tokio::main]
async fn main() {
    // 1. Configuration
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise crate debug + request-level info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "edu_marketplace=debug,tower_http=info".into());

    match config.env {
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
        // JSON lines for the log aggregator.
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Database migrations failed.");
    tracing::info!("Database migrations applied");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. Curation
    if config.curation.api_key.is_none() {
        tracing::warn!("XAI_API_KEY not set; new resources will be curated as Pending");
    }
    tracing::info!(curation = ?config.curation, "Curation configured");
    let curator = Arc::new(
        CurationService::from_config(&config.curation)
            .expect("FATAL: Failed to build the curation HTTP client."),
    );

    // 5. Router and server
    let port = config.port;
    let app = create_router(AppState {
        repo,
        curator,
        config,
    });

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener.");

    tracing::info!("Listening on {}", addr);
    tracing::info!("API Documentation (Swagger UI) at http://localhost:{}/swagger-ui", port);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("HTTP server terminated: {}", e);
    }
}
