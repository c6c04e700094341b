//! Print one generated batch as JSON without touching a database.
//!
//! Environment variables:
//! - BATCH_SIZE: Number of records to generate (default: 3, at most 1000)
//! - SEED: Optional seed for a reproducible batch

use anyhow::{ensure, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use std::env;
use taskseed::{labels::label_pool, SeedOptionsBuilder, TaskGenerator};

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let batch_size: usize = env::var("BATCH_SIZE")
        .unwrap_or_else(|_| "3".to_string())
        .parse()
        .context("BATCH_SIZE must be a valid integer")?;
    ensure!(
        batch_size <= SeedOptionsBuilder::MAX_BATCH_SIZE,
        "BATCH_SIZE must be at most {}",
        SeedOptionsBuilder::MAX_BATCH_SIZE
    );

    let mut rng = match env::var("SEED") {
        Ok(seed) => StdRng::seed_from_u64(seed.parse().context("SEED must be a valid integer")?),
        Err(_) => StdRng::from_entropy(),
    };

    let kinds = label_pool(&mut rng, SeedOptionsBuilder::DEFAULT_KIND_POOL_SIZE);
    let queues = label_pool(&mut rng, SeedOptionsBuilder::DEFAULT_QUEUE_POOL_SIZE);

    let batch = TaskGenerator::new(&kinds, &queues).generate(&mut rng, batch_size)?;

    println!("{}", serde_json::to_string_pretty(&batch)?);

    Ok(())
}
