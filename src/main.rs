use nps_notifier::checkpoint::PgCheckpointStore;
use nps_notifier::clock::SystemClock;
use nps_notifier::config::Config;
use nps_notifier::db::Database;
use nps_notifier::handlers::{self, AppState};
use nps_notifier::pipeline::Notifier;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the notifier service.
///
/// Initializes tracing, configuration, the checkpoint store and the
/// pipeline, then serves the trigger endpoint until shut down.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nps_notifier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let store = PgCheckpointStore::new(
        db.pool.clone(),
        &config.checkpoint_table,
        config.checkpoint_id,
    )?;
    store.ensure_schema().await?;
    tracing::info!("Checkpoint table {} ready", config.checkpoint_table);

    let notifier = Notifier::from_config(&config, Arc::new(store), Arc::new(SystemClock))?;
    let app = handlers::router(Arc::new(AppState::new(notifier)));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
