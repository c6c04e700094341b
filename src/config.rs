use std::path::PathBuf;

use clap::Parser;

use crate::error::Result;
use crate::seed::{SeedOptions, SeedOptionsBuilder};

/// Fill a task table with synthetic rows for load testing.
///
/// Every flag can also be given through the environment (or a `.env` file).
#[derive(Debug, Parser)]
#[command(name = "taskseed", version)]
pub struct Args {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Table to clear and fill, optionally schema qualified.
    #[arg(long, env = "TASKS_TABLE", default_value = SeedOptionsBuilder::DEFAULT_TABLE)]
    pub table: String,

    #[arg(long, env = "NUM_BATCHES", default_value_t = SeedOptionsBuilder::DEFAULT_NUM_BATCHES)]
    pub num_batches: usize,

    /// Records per batch, at most 1000.
    #[arg(long, env = "BATCH_SIZE", default_value_t = SeedOptionsBuilder::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Number of distinct `kind` labels to draw from.
    #[arg(long, env = "KIND_POOL_SIZE", default_value_t = SeedOptionsBuilder::DEFAULT_KIND_POOL_SIZE)]
    pub kinds: usize,

    /// Number of distinct `queue` labels to draw from.
    #[arg(long, env = "QUEUE_POOL_SIZE", default_value_t = SeedOptionsBuilder::DEFAULT_QUEUE_POOL_SIZE)]
    pub queues: usize,

    /// Seed the generator for a reproducible run.
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// Insert the generated ids instead of leaving `id` to its column default.
    ///
    /// Cannot be combined with both `--keep-existing` and `--seed`: the run
    /// would reinsert the ids a previous run with that seed produced.
    #[arg(long, env = "KEEP_IDS")]
    pub keep_ids: bool,

    /// Skip deleting the rows already in the table.
    #[arg(long, env = "KEEP_EXISTING")]
    pub keep_existing: bool,

    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Write a JSON summary of the run to this path.
    #[arg(long, env = "REPORT_PATH")]
    pub report: Option<PathBuf>,
}

impl Args {
    pub fn seed_options(&self) -> Result<SeedOptions> {
        SeedOptions::builder()
            .table(&self.table)
            .num_batches(self.num_batches)
            .batch_size(self.batch_size)
            .kind_pool_size(self.kinds)
            .queue_pool_size(self.queues)
            .seed(self.seed)
            .keep_ids(self.keep_ids)
            .keep_existing(self.keep_existing)
            .build()
    }
}
