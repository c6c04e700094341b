//! Clears the task table and fills it with synthetic tasks.
//!
//! Configuration comes from flags or the environment (see `--help`):
//! - DATABASE_URL: PostgreSQL connection string
//! - TASKS_TABLE: Target table (default: chang.tasks)
//! - NUM_BATCHES: Number of insert batches (default: 1000)
//! - BATCH_SIZE: Records per batch (default: 750, at most 1000)
//! - KIND_POOL_SIZE: Number of `kind` labels (default: 100)
//! - QUEUE_POOL_SIZE: Number of `queue` labels (default: 20)
//! - SEED: Optional seed for a reproducible run
//! - KEEP_IDS: Insert the generated ids (default: false)
//! - KEEP_EXISTING: Skip the initial delete (default: false)
//! - MAX_CONNECTIONS: Connection pool size (default: 5)
//! - REPORT_PATH: Optional path for a JSON run report

use anyhow::{Context, Result};
use clap::Parser;
use taskseed::{config::Args, connect, init_tracing};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing("taskseed=info");

    let args = Args::parse();
    let options = args.seed_options().context("invalid seed options")?;

    info!("Connecting to database...");
    let pool = connect(&args.database_url, args.max_connections)
        .await
        .context("failed to connect to database")?;

    let report = options.run(&pool).await.context("failed to seed tasks")?;

    if let Some(path) = &args.report {
        report.write(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
