//! Board Service entry point

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_service::config::Config;
use board_service::db::Database;
use board_service::graphql::{self, JwtVerifier, SchemaDeps, TokenVerifier};
use board_service::{AppState, api};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Board Service");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    if let Some(dir) = sqlite_parent_dir(&config.database_url) {
        std::fs::create_dir_all(dir)?;
    }
    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    let sync = db.migrate().await?;
    tracing::info!(tables_created = ?sync.tables_created, columns_added = ?sync.columns_added, "Database ready");

    let verifier: Arc<dyn TokenVerifier> =
        Arc::new(JwtVerifier::new(&config.jwt_secret, config.token_lifetime));
    let schema = graphql::build_schema(SchemaDeps::from_database(&db, verifier));
    tracing::info!("GraphQL schema built");

    let state = AppState {
        db: db.clone(),
        schema,
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Board Service stopped");
    Ok(())
}

/// Directory holding a file-backed SQLite database, if any
fn sqlite_parent_dir(url: &str) -> Option<&std::path::Path> {
    let path = url.strip_prefix("sqlite:")?;
    let path = path.split('?').next()?.trim_start_matches("//");
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
