use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::{debug, info};

use crate::error::{Result, SeedError};
use crate::labels::{label_pool, DEFAULT_POOL_SIZE};
use crate::task::TaskGenerator;

/// Record columns and the types `jsonb_to_recordset` decodes them as.
const COLUMNS: &[(&str, &str)] = &[
    ("max_attempts", "smallint"),
    ("scheduled_at", "timestamptz"),
    ("priority", "smallint"),
    ("args", "jsonb"),
    ("attempted_by", "text[]"),
    ("kind", "text"),
    ("queue", "text"),
    ("tags", "text[]"),
    ("depends_on", "uuid"),
    ("dependend_id", "uuid"),
];

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub table: String,
    pub num_batches: usize,
    pub batch_size: usize,
    pub kind_pool_size: usize,
    pub queue_pool_size: usize,
    pub seed: Option<u64>,
    pub keep_ids: bool,
    pub keep_existing: bool,
}

pub struct SeedOptionsBuilder {
    table: Option<String>,
    num_batches: Option<usize>,
    batch_size: Option<usize>,
    kind_pool_size: Option<usize>,
    queue_pool_size: Option<usize>,
    seed: Option<u64>,
    keep_ids: bool,
    keep_existing: bool,
}

impl Default for SeedOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedOptionsBuilder {
    pub const DEFAULT_TABLE: &'static str = "chang.tasks";
    pub const DEFAULT_NUM_BATCHES: usize = 1000;
    pub const DEFAULT_BATCH_SIZE: usize = 750;
    pub const DEFAULT_KIND_POOL_SIZE: usize = DEFAULT_POOL_SIZE;
    pub const DEFAULT_QUEUE_POOL_SIZE: usize = 20;
    /// Each record nests every earlier one in `args`, so a batch's JSON grows
    /// quadratically and nests as deep as the batch is long.
    pub const MAX_BATCH_SIZE: usize = 1000;

    pub fn new() -> Self {
        Self {
            table: None,
            num_batches: None,
            batch_size: None,
            kind_pool_size: None,
            queue_pool_size: None,
            seed: None,
            keep_ids: false,
            keep_existing: false,
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn num_batches(mut self, num_batches: usize) -> Self {
        self.num_batches = Some(num_batches);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn kind_pool_size(mut self, size: usize) -> Self {
        self.kind_pool_size = Some(size);
        self
    }

    pub fn queue_pool_size(mut self, size: usize) -> Self {
        self.queue_pool_size = Some(size);
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn keep_ids(mut self, keep_ids: bool) -> Self {
        self.keep_ids = keep_ids;
        self
    }

    pub fn keep_existing(mut self, keep_existing: bool) -> Self {
        self.keep_existing = keep_existing;
        self
    }

    pub fn build(self) -> Result<SeedOptions> {
        let table = self
            .table
            .unwrap_or_else(|| Self::DEFAULT_TABLE.to_string());

        if !is_table_name(&table) {
            return Err(SeedError::InvalidTable(table));
        }

        let batch_size = self.batch_size.unwrap_or(Self::DEFAULT_BATCH_SIZE);
        if batch_size > Self::MAX_BATCH_SIZE {
            return Err(SeedError::BatchTooLarge {
                size: batch_size,
                max: Self::MAX_BATCH_SIZE,
            });
        }

        if self.keep_ids && self.keep_existing && self.seed.is_some() {
            return Err(SeedError::DuplicateIds);
        }

        Ok(SeedOptions {
            table,
            num_batches: self.num_batches.unwrap_or(Self::DEFAULT_NUM_BATCHES),
            batch_size,
            kind_pool_size: self
                .kind_pool_size
                .unwrap_or(Self::DEFAULT_KIND_POOL_SIZE),
            queue_pool_size: self
                .queue_pool_size
                .unwrap_or(Self::DEFAULT_QUEUE_POOL_SIZE),
            seed: self.seed,
            keep_ids: self.keep_ids,
            keep_existing: self.keep_existing,
        })
    }
}

/// `name` or `schema.name`, each part a plain unquoted identifier.
fn is_table_name(table: &str) -> bool {
    let parts: Vec<&str> = table.split('.').collect();

    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

impl SeedOptions {
    pub fn builder() -> SeedOptionsBuilder {
        SeedOptionsBuilder::new()
    }

    /// The DELETE clearing the table first, or `None` under `keep_existing`.
    pub fn delete_statement(&self) -> Option<String> {
        (!self.keep_existing).then(|| format!("DELETE FROM {}", self.table))
    }

    pub fn insert_statement(&self) -> String {
        let columns: Vec<(&str, &str)> = self
            .keep_ids
            .then_some(("id", "uuid"))
            .into_iter()
            .chain(COLUMNS.iter().copied())
            .collect();

        let names = columns
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");

        let record_type = columns
            .iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({names}) SELECT * FROM jsonb_to_recordset($1) AS x({record_type})",
            self.table
        )
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Clears the table (unless asked not to) and inserts
    /// `num_batches * batch_size` fabricated tasks.
    ///
    /// Runs in one transaction: a failed batch leaves the table untouched.
    pub async fn run(&self, pool: &PgPool) -> Result<SeedReport> {
        let started = Instant::now();
        let mut tx = pool.begin().await?;

        let deleted = match self.delete_statement() {
            Some(delete) => {
                info!(table = %self.table, "Delete current tasks");
                sqlx::query(&delete)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
            }
            None => 0,
        };

        let mut rng = self.rng();
        let kinds = label_pool(&mut rng, self.kind_pool_size);
        let queues = label_pool(&mut rng, self.queue_pool_size);
        let generator = TaskGenerator::new(&kinds, &queues).anchored_at(Utc::now());
        let insert = self.insert_statement();

        let mut inserted = 0;
        for n in 1..=self.num_batches {
            let batch = generator.generate(&mut rng, self.batch_size)?;
            info!("Insert batch: {n}/{}", self.num_batches);

            let rows = sqlx::query(&insert)
                .bind(Json(&batch))
                .execute(&mut *tx)
                .await?
                .rows_affected();

            debug!(rows, "batch inserted");
            inserted += rows;
        }

        tx.commit().await?;

        let report = SeedReport {
            table: self.table.clone(),
            deleted,
            batches: self.num_batches,
            inserted,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(inserted, deleted, elapsed_ms = report.elapsed_ms, "seeding finished");

        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub table: String,
    pub deleted: u64,
    pub batches: usize,
    pub inserted: u64,
    pub elapsed_ms: u64,
}

impl SeedReport {
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        std::fs::write(path, json).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let options = SeedOptions::builder().build().unwrap();

        assert_eq!(options.table, "chang.tasks");
        assert_eq!(options.num_batches, 1000);
        assert_eq!(options.batch_size, 750);
        assert_eq!(options.kind_pool_size, 100);
        assert_eq!(options.queue_pool_size, 20);
        assert_eq!(options.seed, None);
        assert!(!options.keep_ids);
        assert!(!options.keep_existing);
    }

    #[test]
    fn rejects_unsafe_table_names() {
        for table in ["tasks; drop table x", "a.b.c", "", "1tasks", "\"tasks\"", "chang."] {
            let err = SeedOptions::builder().table(table).build().unwrap_err();
            assert!(matches!(err, SeedError::InvalidTable(_)), "{table}");
        }

        for table in ["tasks", "chang.tasks", "_private.task_rows2"] {
            assert!(SeedOptions::builder().table(table).build().is_ok(), "{table}");
        }
    }

    #[test]
    fn insert_leaves_id_to_the_database() {
        let sql = SeedOptions::builder().build().unwrap().insert_statement();

        assert_eq!(
            sql,
            "INSERT INTO chang.tasks (max_attempts, scheduled_at, priority, args, attempted_by, \
             kind, queue, tags, depends_on, dependend_id) SELECT * FROM jsonb_to_recordset($1) \
             AS x(max_attempts smallint, scheduled_at timestamptz, priority smallint, args jsonb, \
             attempted_by text[], kind text, queue text, tags text[], depends_on uuid, \
             dependend_id uuid)"
        );
    }

    #[test]
    fn insert_with_ids() {
        let sql = SeedOptions::builder()
            .table("tasks")
            .keep_ids(true)
            .build()
            .unwrap()
            .insert_statement();

        assert!(sql.starts_with("INSERT INTO tasks (id, max_attempts,"));
        assert!(sql.contains("AS x(id uuid, max_attempts smallint,"));
    }

    #[test]
    fn delete_targets_table() {
        let options = SeedOptions::builder().table("public.jobs").build().unwrap();
        assert_eq!(
            options.delete_statement().as_deref(),
            Some("DELETE FROM public.jobs")
        );
    }

    #[test]
    fn keep_existing_skips_delete() {
        let options = SeedOptions::builder()
            .table("public.jobs")
            .keep_existing(true)
            .build()
            .unwrap();

        assert_eq!(options.delete_statement(), None);
    }

    #[test]
    fn batch_size_is_capped() {
        let max = SeedOptionsBuilder::MAX_BATCH_SIZE;
        assert!(SeedOptions::builder().batch_size(max).build().is_ok());

        let err = SeedOptions::builder()
            .batch_size(20_000)
            .build()
            .unwrap_err();
        assert!(matches!(err, SeedError::BatchTooLarge { size: 20_000, max: m } if m == max));
    }

    #[test]
    fn fixed_seed_cannot_reinsert_kept_ids() {
        let err = SeedOptions::builder()
            .keep_ids(true)
            .keep_existing(true)
            .seed(Some(3))
            .build()
            .unwrap_err();
        assert!(matches!(err, SeedError::DuplicateIds));

        for (keep_ids, keep_existing, seed) in [
            (true, true, None),
            (true, false, Some(3)),
            (false, true, Some(3)),
        ] {
            assert!(SeedOptions::builder()
                .keep_ids(keep_ids)
                .keep_existing(keep_existing)
                .seed(seed)
                .build()
                .is_ok());
        }
    }

    #[test]
    fn report_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = SeedReport {
            table: "chang.tasks".into(),
            deleted: 4,
            batches: 2,
            inserted: 10,
            elapsed_ms: 17,
        };

        report.write(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["inserted"], 10);
        assert_eq!(value["deleted"], 4);
        assert_eq!(value["table"], "chang.tasks");
    }

    #[test]
    fn report_write_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let report = SeedReport {
            table: "t".into(),
            deleted: 0,
            batches: 0,
            inserted: 0,
            elapsed_ms: 0,
        };

        let err = report.write(&path).unwrap_err();
        assert!(matches!(err, SeedError::Io { path: ref p, .. } if *p == path));
    }
}
