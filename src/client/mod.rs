// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search engine client
//!
//! The orchestrator itself only asks the client which concrete indexes sit
//! behind an alias. The remaining operations are what [`Index`] implementations
//! use to create, alias and drop their concrete indexes.
//!
//! [`Index`]: crate::index::Index

mod memory;
mod request;

pub use memory::{InMemorySearchClient, RecordedSearch};
pub use request::{SearchHit, SearchRequest, SearchResponse, SortField, SortOrder};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::OrchestratorError;
use crate::index::highest_version;

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Concrete indexes the alias currently points at. Empty for an unknown alias.
    async fn indices_behind_alias(&self, alias: &str) -> Result<Vec<String>, OrchestratorError>;

    /// Highest schema version among the indexes behind `alias`.
    ///
    /// `None` when the alias doesn't exist or points at nothing versioned.
    async fn current_version_behind_alias(
        &self,
        alias: &str,
    ) -> Result<Option<u32>, OrchestratorError> {
        let indices = self.indices_behind_alias(alias).await?;
        Ok(highest_version(alias, indices.iter().map(String::as_str)))
    }

    async fn index_exists(&self, index: &str) -> Result<bool, OrchestratorError>;

    /// Create a concrete index with the given settings/mappings body
    async fn create_index(&self, index: &str, body: Value) -> Result<(), OrchestratorError>;

    /// Drop a concrete index. Missing indexes are ignored.
    async fn delete_index(&self, index: &str) -> Result<(), OrchestratorError>;

    async fn put_alias(&self, alias: &str, index: &str) -> Result<(), OrchestratorError>;

    async fn remove_alias(&self, alias: &str, index: &str) -> Result<(), OrchestratorError>;

    /// Run a search against an index or alias
    async fn execute_search(&self, index: &str, body: Value) -> Result<SearchResponse, OrchestratorError>;
}

/// Run a typed request against `index` and decode the hits.
pub async fn search<T: DeserializeOwned>(
    client: &dyn SearchClient,
    index: &str,
    request: &SearchRequest<T>,
) -> Result<Vec<T>, OrchestratorError> {
    let response = client.execute_search(index, request.to_body()).await?;
    response.documents()
}
