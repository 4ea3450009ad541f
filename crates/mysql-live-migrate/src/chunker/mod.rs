//! Chunked copy engine.
//!
//! Partitions the origin table's id space into bounded ranges and copies
//! each range with one idempotent `INSERT IGNORE ... SELECT` statement while
//! the origin stays under live traffic. Chunks are issued strictly
//! sequentially in increasing id order; the only concurrency this engine
//! manages is the external production workload, by keeping each statement's
//! lock scope short and pacing itself through the injected throttler.
//!
//! A crash or fatal error leaves the destination populated up to the last
//! committed chunk. Re-running the same range is safe: the insert-ignore
//! semantics skip rows that already made it to the destination.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::db::SqlExecutor;
use crate::error::{MigrateError, Result};
use crate::migration::{quote_ident, Migration};
use crate::printer::{PercentagePrinter, Printer};
use crate::throttler::{Throttler, TimeThrottler};

/// Default maximum retries for a chunk hitting lock contention.
pub const LOCK_WAIT_RETRIES: u32 = 10;

/// Default sleep between lock-contention retries.
pub const RETRY_WAIT: Duration = Duration::from_secs(5);

/// Construction-time options for [`Chunker`].
#[derive(Debug, Clone)]
pub struct ChunkerOptions {
    /// Maximum re-attempts for a chunk failing with lock contention.
    pub lock_wait_retries: u32,

    /// Fixed sleep between re-attempts.
    pub retry_wait: Duration,

    /// Explicit lower id bound, bypassing the `min(id)` probe.
    pub start: Option<i64>,

    /// Explicit upper id bound, bypassing the `max(id)` probe.
    pub limit: Option<i64>,
}

impl Default for ChunkerOptions {
    fn default() -> Self {
        Self {
            lock_wait_retries: LOCK_WAIT_RETRIES,
            retry_wait: RETRY_WAIT,
            start: None,
            limit: None,
        }
    }
}

/// Totals for one completed copy run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Chunks issued.
    pub chunks: u64,
    /// Rows the destination reported as changed.
    pub rows_copied: u64,
}

/// Copies all eligible origin rows into the destination, one chunk at a time.
pub struct Chunker {
    migration: Migration,
    executor: Arc<dyn SqlExecutor>,
    throttler: Box<dyn Throttler>,
    printer: Box<dyn Printer>,
    max_retries: u32,
    retry_wait: Duration,
    start: Option<i64>,
    limit: Option<i64>,
}

impl Chunker {
    /// Create a chunker, resolving the overall id range.
    ///
    /// The range is `(min(id), max(id))` over the origin table unless
    /// `options` overrides it; an empty origin leaves it unresolved and
    /// [`execute`](Self::execute) becomes a no-op. Fails with a
    /// configuration error when the resolved range is impossible, before any
    /// copy statement is issued.
    pub async fn new(
        migration: Migration,
        executor: Arc<dyn SqlExecutor>,
        options: ChunkerOptions,
    ) -> Result<Self> {
        let start = match options.start {
            Some(start) => Some(start),
            None => select_bound(executor.as_ref(), &migration, "min").await?,
        };
        let limit = match options.limit {
            Some(limit) => Some(limit),
            None => select_bound(executor.as_ref(), &migration, "max").await?,
        };

        let chunker = Self {
            migration,
            executor,
            throttler: Box::new(TimeThrottler::default()),
            printer: Box::new(PercentagePrinter::new()),
            max_retries: options.lock_wait_retries,
            retry_wait: options.retry_wait,
            start,
            limit,
        };
        chunker.validate()?;
        Ok(chunker)
    }

    /// Replace the default fixed-interval throttler.
    pub fn with_throttler(mut self, throttler: Box<dyn Throttler>) -> Self {
        self.throttler = throttler;
        self
    }

    /// Replace the default percentage reporter.
    pub fn with_printer(mut self, printer: Box<dyn Printer>) -> Self {
        self.printer = printer;
        self
    }

    /// The resolved `[start, limit]` id range, when the origin has rows.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        self.start.zip(self.limit)
    }

    /// Reject impossible chunk options.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(limit)) = (self.start, self.limit) {
            if start > limit {
                return Err(MigrateError::Config(
                    "impossible chunk options (limit must be greater than start)".into(),
                ));
            }
        }
        Ok(())
    }

    /// Run the copy to completion.
    ///
    /// Returns the first fatal error unmodified; completed chunks stay
    /// committed and the reporter's terminal state is only signalled on a
    /// normal finish.
    pub async fn execute(mut self) -> Result<CopyStats> {
        let (start, limit) = match (self.start, self.limit) {
            (Some(start), Some(limit)) => (start, limit),
            _ => {
                info!(
                    "origin table {} is empty, nothing to copy",
                    self.migration.origin()
                );
                return Ok(CopyStats::default());
            }
        };

        info!(
            "copying {} to {} over id range [{}, {}]",
            self.migration.origin(),
            self.migration.destination(),
            start,
            limit
        );

        let mut stats = CopyStats::default();
        let mut next_to_insert = start;

        while next_to_insert <= limit {
            let stride = self.throttler.stride().max(1);
            let bottom = next_to_insert;
            let top = self.upper_id(bottom, stride, limit).await?;

            let statement = self.copy_statement(bottom, top);
            let affected = self.insert_with_retry(&statement).await?;

            debug!(
                "chunk [{}, {}] affected {} rows (stride {})",
                bottom, top, affected, stride
            );
            stats.chunks += 1;
            stats.rows_copied += affected;

            if affected > 0 {
                self.throttler.run().await;
            }
            self.printer.notify_detailed(bottom, top, limit, affected);

            next_to_insert = top + 1;
        }

        self.printer.end();
        info!(
            "copied {} rows into {} in {} chunks",
            stats.rows_copied,
            self.migration.destination(),
            stats.chunks
        );
        Ok(stats)
    }

    /// Resolve the chunk's upper bound: the id of the `stride`-th row at or
    /// after `bottom`, clamped to `limit`.
    ///
    /// An offset probe rather than id arithmetic, since deletes leave gaps in
    /// the id space. The probe scans `stride` index entries per chunk; for
    /// very sparse id spaces that cost is linear in the stride.
    async fn upper_id(&self, bottom: i64, stride: u64, limit: i64) -> Result<i64> {
        let sql = format!(
            "select id from {} where id >= {} order by id limit 1 offset {}",
            quote_ident(self.migration.origin()),
            bottom,
            stride - 1
        );
        let top = self.executor.select_value(&sql).await?;
        // no row at that offset means the table ends before the stride does
        Ok(top.unwrap_or(limit).min(limit))
    }

    /// Build the idempotent bulk-copy statement for `[lowest, highest]`.
    ///
    /// `insert ignore` skips rows already present in the destination, which
    /// is what makes re-issuing the same range after a partial failure safe.
    fn copy_statement(&self, lowest: i64, highest: i64) -> String {
        let origin = quote_ident(self.migration.origin());

        let mut conditions: Vec<String> = self
            .migration
            .filter()
            .clauses()
            .iter()
            .map(|clause| format!("({})", clause))
            .collect();
        conditions.push(format!(
            "{}.`id` between {} and {}",
            origin, lowest, highest
        ));

        format!(
            "insert ignore into {} ({}) select {} from {} where {}",
            quote_ident(self.migration.destination()),
            self.migration.intersection().joined(),
            self.migration.intersection().typed(self.migration.origin()),
            origin,
            conditions.join(" and ")
        )
    }

    /// Execute one copy statement, re-issuing it on bounded lock contention.
    async fn insert_with_retry(&self, sql: &str) -> Result<u64> {
        let mut retries = 0u32;
        loop {
            match self.executor.update(sql).await {
                Ok(affected) => return Ok(affected),
                Err(e) if e.is_lock_contention() && retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        "{} - retrying chunk ({}/{})",
                        e, retries, self.max_retries
                    );
                    tokio::time::sleep(self.retry_wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn select_bound(
    executor: &dyn SqlExecutor,
    migration: &Migration,
    func: &str,
) -> Result<Option<i64>> {
    executor
        .select_value(&format!(
            "select {}(id) from {}",
            func,
            quote_ident(migration.origin())
        ))
        .await
}
