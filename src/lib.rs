//! Seed a Postgres task table with synthetic rows for load testing.
//!
//! [`labels::label_pool`] builds the random `kind`/`queue` labels,
//! [`TaskGenerator`] fabricates batches of [`TaskRecord`]s from them and
//! [`SeedOptions::run`] clears the target table and bulk inserts the batches.

pub mod config;
pub mod error;
pub mod labels;
pub mod seed;
pub mod task;

pub use error::{Result, SeedError};
pub use seed::{connect, SeedOptions, SeedOptionsBuilder, SeedReport};
pub use task::{Batch, TaskGenerator, TaskRecord};

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber; `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
