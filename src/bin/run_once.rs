//! Runs the notification pipeline once, for cron-style schedulers.

use nps_notifier::checkpoint::PgCheckpointStore;
use nps_notifier::clock::SystemClock;
use nps_notifier::config::Config;
use nps_notifier::db::Database;
use nps_notifier::pipeline::Notifier;
use std::sync::Arc;

/// Prints the run status (`OK` or `Nothing to update.`) and exits non-zero on failure.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nps_notifier=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;
    let store = PgCheckpointStore::new(
        db.pool.clone(),
        &config.checkpoint_table,
        config.checkpoint_id,
    )?;

    let notifier = Notifier::from_config(&config, Arc::new(store), Arc::new(SystemClock))?;

    match notifier.run().await {
        Ok(outcome) => {
            println!("{}", outcome.status());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
