use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    /// Picking uniformly from an empty label pool is undefined.
    #[error("invalid argument: {pool} pool is empty")]
    EmptyPool { pool: &'static str },

    #[error("invalid table name '{0}'")]
    InvalidTable(String),

    #[error("batch size {size} exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Reseeding with the same seed and keeping both rows and ids would
    /// insert the same primary keys twice.
    #[error("keep_ids with keep_existing cannot reuse a fixed seed")]
    DuplicateIds,

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SeedError>;
