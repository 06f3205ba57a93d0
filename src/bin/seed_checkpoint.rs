//! Creates the checkpoint table and stores an initial checkpoint.
//!
//! Usage: `seed-checkpoint [UNIX_TIMESTAMP]`. Without an argument the current
//! time is used, so only answers arriving after seeding get notified.

use nps_notifier::checkpoint::{CheckpointStore, PgCheckpointStore};
use nps_notifier::config::Config;
use nps_notifier::db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let timestamp = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Checkpoint must be a unix timestamp, got '{}'", arg))?,
        None => chrono::Utc::now().timestamp(),
    };

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;
    let store = PgCheckpointStore::new(
        db.pool.clone(),
        &config.checkpoint_table,
        config.checkpoint_id,
    )?;

    store.ensure_schema().await?;
    store.write(timestamp).await?;

    tracing::info!(
        "Checkpoint {} (id {}) seeded with {}",
        config.checkpoint_table,
        config.checkpoint_id,
        timestamp
    );

    Ok(())
}
