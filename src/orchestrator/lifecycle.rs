//! Batch lifecycle operations: configure, maintain, delete, reindex.
//!
//! Configure, maintain and delete attempt every target index and report all
//! per-index failures together as a [`BatchError`]; a failed configure still
//! carries the outcomes of the indexes that succeeded. Reindex blocks the
//! caller and stops at the first failure.

use tracing::{debug, info, instrument, warn};

use super::migration::Migration;
use super::{ConfigureReport, IndexOrchestrator, IndexOutcome, MigrationOutcome};
use crate::error::{BatchError, IndexFailure, OrchestratorError};
use crate::index::{ProgressFn, RegisteredIndex};
use crate::metrics::{self, BatchTimer};

fn finish(operation: &'static str, failures: Vec<IndexFailure>) -> Result<(), OrchestratorError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(BatchError::new(operation, failures).into())
    }
}

fn record(operation: &'static str, result: Result<(), OrchestratorError>) -> Result<(), OrchestratorError> {
    metrics::record_index_operation(operation, result.is_ok());
    result
}

impl IndexOrchestrator {
    /// Configure with the configured migration policy over every registered index
    pub async fn configure(&self) -> Result<ConfigureReport, OrchestratorError> {
        self.configure_indexes(None, self.config.begin_reindexing_outdated)
            .await
    }

    /// Configure each index, maintain the maintainable ones, then (optionally)
    /// enqueue a reindex for every index whose alias lags its target version.
    ///
    /// With `begin_reindexing_outdated` set, a missing lock provider or work
    /// queue fails the call before any index is touched.
    #[instrument(skip(self, indexes))]
    pub async fn configure_indexes(
        &self,
        indexes: Option<&[RegisteredIndex]>,
        begin_reindexing_outdated: bool,
    ) -> Result<ConfigureReport, OrchestratorError> {
        let migration = if begin_reindexing_outdated {
            Some(self.migration()?)
        } else {
            None
        };

        let targets = self.targets(indexes);
        let _timer = BatchTimer::new("configure");
        let mut report = ConfigureReport::default();
        let mut failures = Vec::new();

        for index in &targets {
            match self.configure_one(index, migration.as_ref()).await {
                Ok(outcome) => report.outcomes.push(IndexOutcome {
                    index: index.name().to_string(),
                    migration: outcome,
                }),
                Err(error) => {
                    warn!(index = %index.name(), error = %error, "Configure failed");
                    failures.push(IndexFailure {
                        index: index.name().to_string(),
                        error,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(BatchError::new("configure", failures)
                .with_partial_report(report)
                .into());
        }
        info!(
            count = targets.len(),
            enqueued = report.enqueued_count(),
            "Indexes configured"
        );
        Ok(report)
    }

    async fn configure_one(
        &self,
        index: &RegisteredIndex,
        migration: Option<&Migration<'_>>,
    ) -> Result<MigrationOutcome, OrchestratorError> {
        debug!(index = %index.name(), version = index.version(), "Configuring index");
        record("configure", index.index().configure().await)?;

        if index.capabilities().maintainable {
            record("maintain", index.index().maintain().await)?;
        }

        let outcome = match migration {
            Some(migration) => self.detect_migration(index, migration).await?,
            None => MigrationOutcome::Disabled,
        };
        metrics::record_migration_decision(outcome.as_str());
        Ok(outcome)
    }

    /// Run maintenance on every maintainable index; others are skipped.
    #[instrument(skip(self, indexes))]
    pub async fn maintain_indexes(
        &self,
        indexes: Option<&[RegisteredIndex]>,
    ) -> Result<(), OrchestratorError> {
        let targets = self.targets(indexes);
        let _timer = BatchTimer::new("maintain");
        let mut failures = Vec::new();

        for index in targets.iter().filter(|i| i.capabilities().maintainable) {
            if let Err(error) = record("maintain", index.index().maintain().await) {
                warn!(index = %index.name(), error = %error, "Maintenance failed");
                failures.push(IndexFailure {
                    index: index.name().to_string(),
                    error,
                });
            }
        }

        finish("maintain", failures)
    }

    /// Delete every target index, continuing past failures.
    #[instrument(skip(self, indexes))]
    pub async fn delete_indexes(
        &self,
        indexes: Option<&[RegisteredIndex]>,
    ) -> Result<(), OrchestratorError> {
        let targets = self.targets(indexes);
        let _timer = BatchTimer::new("delete");
        let mut failures = Vec::new();

        for index in &targets {
            match record("delete", index.index().delete().await) {
                Ok(()) => info!(index = %index.name(), "Index deleted"),
                Err(error) => {
                    warn!(index = %index.name(), error = %error, "Delete failed");
                    failures.push(IndexFailure {
                        index: index.name().to_string(),
                        error,
                    });
                }
            }
        }

        finish("delete", failures)
    }

    /// Reindex every reindexable target index in place, blocking the caller.
    ///
    /// Progress runs from 0 to 100 across the whole call. Each index owns an
    /// equal slice of that range and its own progress is scaled into it.
    #[instrument(skip(self, indexes, progress))]
    pub async fn reindex(
        &self,
        indexes: Option<&[RegisteredIndex]>,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<(), OrchestratorError> {
        let targets = self.targets(indexes);
        let reindexable: Vec<&RegisteredIndex> = targets
            .iter()
            .filter(|i| i.capabilities().reindexable)
            .collect();
        let _timer = BatchTimer::new("reindex");
        let count = reindexable.len() as u32;

        for (position, index) in reindexable.iter().enumerate() {
            let (start, end) = progress_slice(position as u32, count);
            if let Some(report) = progress {
                report(start, &format!("Reindexing {}", index.name()));
            }

            let scaled = move |percent: u32, message: &str| {
                if let Some(report) = progress {
                    report(scale(start, end, percent), message);
                }
            };
            let scaled: &ProgressFn<'_> = &scaled;

            record("reindex", index.index().reindex(progress.map(|_| scaled)).await)?;
            info!(index = %index.name(), "Index reindexed");
        }

        if let Some(report) = progress {
            report(100, "Reindex complete");
        }
        Ok(())
    }
}

/// `[start, end)` percent range owned by the index at `position` of `count`
fn progress_slice(position: u32, count: u32) -> (u32, u32) {
    if count == 0 {
        return (0, 100);
    }
    (position * 100 / count, (position + 1) * 100 / count)
}

fn scale(start: u32, end: u32, percent: u32) -> u32 {
    start + (end - start) * percent.min(100) / 100
}
