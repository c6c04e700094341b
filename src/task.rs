//! Synthetic task records and the batch generator that fabricates them.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use fake::{faker::chrono::en::DateTimeBetween, uuid::UUIDv4, Fake};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, SeedError};

/// How far `scheduled_at` may land from the generator's anchor, either way.
pub const SCHEDULE_SPREAD_DAYS: i64 = 1000;

/// One row destined for the tasks table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub id: Uuid,
    pub max_attempts: i16,
    pub scheduled_at: DateTime<Utc>,
    pub priority: i16,
    /// The record generated just before this one in the same batch.
    pub args: Option<Arc<TaskRecord>>,
    pub attempted_by: Vec<String>,
    pub kind: String,
    pub queue: String,
    pub tags: Vec<String>,
    pub depends_on: Option<Uuid>,
    pub dependend_id: Option<Uuid>,
}

// The `args` chain is as long as the batch; unwind it iteratively instead of
// letting each record drop its predecessor recursively.
impl Drop for TaskRecord {
    fn drop(&mut self) {
        let mut prev = self.args.take();
        while let Some(record) = prev {
            prev = match Arc::try_unwrap(record) {
                Ok(mut record) => record.args.take(),
                Err(_) => None,
            };
        }
    }
}

pub type Batch = Vec<Arc<TaskRecord>>;

/// Fabricates batches of [`TaskRecord`]s from a pair of label pools.
///
/// The generator holds no randomness of its own; every call takes the rng to
/// draw from, so a seeded rng gives a reproducible batch.
#[derive(Debug, Clone)]
pub struct TaskGenerator<'a> {
    kinds: &'a [String],
    queues: &'a [String],
    anchor: DateTime<Utc>,
}

impl<'a> TaskGenerator<'a> {
    pub fn new(kinds: &'a [String], queues: &'a [String]) -> Self {
        Self {
            kinds,
            queues,
            anchor: Utc::now(),
        }
    }

    /// Centers the `scheduled_at` window on `anchor` instead of now.
    pub fn anchored_at(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Generates exactly `batch_size` records.
    ///
    /// Dependency references only ever point at records with a smaller index.
    /// A batch size of zero returns an empty batch without touching the pools.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, batch_size: usize) -> Result<Batch> {
        let spread = Duration::days(SCHEDULE_SPREAD_DAYS);
        let (earliest, latest) = (self.anchor - spread, self.anchor + spread);

        let mut batch: Batch = Vec::with_capacity(batch_size);

        for i in 0..batch_size {
            let record = TaskRecord {
                id: UUIDv4.fake_with_rng(rng),
                max_attempts: rng.gen_range(3..=5),
                scheduled_at: DateTimeBetween(earliest, latest).fake_with_rng(rng),
                priority: rng.gen_range(1..=6),
                args: batch.last().cloned(),
                attempted_by: vec![],
                kind: pick(rng, self.kinds, "kind")?.to_owned(),
                queue: pick(rng, self.queues, "queue")?.to_owned(),
                tags: vec![],
                depends_on: back_reference(rng, &batch[..i]),
                dependend_id: back_reference(rng, &batch[..i]),
            };

            batch.push(Arc::new(record));
        }

        Ok(batch)
    }
}

fn pick<'p, R: Rng + ?Sized>(rng: &mut R, pool: &'p [String], name: &'static str) -> Result<&'p str> {
    if pool.is_empty() {
        return Err(SeedError::EmptyPool { pool: name });
    }

    Ok(&pool[rng.gen_range(0..pool.len())])
}

/// Two chances in six of referencing one of `earlier`.
fn back_reference<R: Rng + ?Sized>(rng: &mut R, earlier: &[Arc<TaskRecord>]) -> Option<Uuid> {
    if earlier.is_empty() || rng.gen_range(0..=5) <= 3 {
        return None;
    }

    Some(earlier[rng.gen_range(0..earlier.len())].id)
}
