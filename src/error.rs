// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types shared by the orchestrator and the query composition layer.

use std::fmt;
use thiserror::Error;

use crate::orchestrator::ConfigureReport;

/// Errors surfaced by the index lifecycle orchestrator and its collaborators.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A collaborator required by the requested feature was not supplied.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The registered index set was already sealed.
    #[error("Can't add index '{0}' after the index set has been sealed")]
    RegistrationFrozen(String),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Search engine, lock provider or queue reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),

    /// One or more indexes failed inside a batch operation.
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl OrchestratorError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Per-index failures when this is a batch error, empty otherwise.
    #[must_use]
    pub fn failures(&self) -> &[IndexFailure] {
        match self {
            Self::Batch(batch) => &batch.failures,
            _ => &[],
        }
    }

    /// Outcomes of the indexes a failed configure pass did get through.
    #[must_use]
    pub fn partial_report(&self) -> Option<&ConfigureReport> {
        match self {
            Self::Batch(batch) => batch.partial_report.as_ref(),
            _ => None,
        }
    }
}

/// A single index's failure inside a batch operation.
#[derive(Debug)]
pub struct IndexFailure {
    /// Logical index name
    pub index: String,
    pub error: OrchestratorError,
}

/// Aggregate failure of a batch operation.
///
/// Every index in the batch was attempted; `failures` lists each one that failed,
/// in the order they were processed.
#[derive(Debug)]
pub struct BatchError {
    pub operation: &'static str,
    pub failures: Vec<IndexFailure>,
    /// Set by configure: outcomes of the indexes that succeeded
    pub partial_report: Option<ConfigureReport>,
}

impl BatchError {
    pub fn new(operation: &'static str, failures: Vec<IndexFailure>) -> Self {
        Self {
            operation,
            failures,
            partial_report: None,
        }
    }

    #[must_use]
    pub fn with_partial_report(mut self, report: ConfigureReport) -> Self {
        self.partial_report = Some(report);
        self
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {} index(es): ",
            self.operation,
            self.failures.len()
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", failure.index, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

/// Errors raised while building a query.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Failed to resolve include '{name}': {reason}")]
    Include { name: String, reason: String },

    /// A query builder rejected the source query.
    #[error("Query builder error: {0}")]
    Builder(String),
}

impl QueryError {
    pub fn builder(msg: impl Into<String>) -> Self {
        Self::Builder(msg.into())
    }
}
