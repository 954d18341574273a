use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;

use super::request::{SearchHit, SearchResponse};
use super::SearchClient;
use crate::error::OrchestratorError;

/// A search issued against the in-memory client.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSearch {
    pub index: String,
    pub body: Value,
}

/// In-process search client for tests and embedding.
///
/// Keeps concrete indexes, aliases and canned hits in memory. Searches are
/// recorded and answered from the canned hits of the target index, or of
/// every index behind the target alias.
#[derive(Default)]
pub struct InMemorySearchClient {
    indices: DashMap<String, Value>,
    aliases: DashMap<String, BTreeSet<String>>,
    hits: DashMap<String, Vec<SearchHit>>,
    searches: Mutex<Vec<RecordedSearch>>,
}

impl InMemorySearchClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `index` (if missing) and point `alias` at it
    #[must_use]
    pub fn with_alias(self, alias: &str, index: &str) -> Self {
        self.indices
            .entry(index.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        self.aliases
            .entry(alias.to_string())
            .or_default()
            .insert(index.to_string());
        self
    }

    /// Canned hit returned by searches against `hit.index`
    pub fn add_hit(&self, hit: SearchHit) {
        self.hits.entry(hit.index.clone()).or_default().push(hit);
    }

    /// Concrete index names, sorted
    #[must_use]
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indices.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Body the index was created with
    #[must_use]
    pub fn index_body(&self, index: &str) -> Option<Value> {
        self.indices.get(index).map(|e| e.value().clone())
    }

    #[must_use]
    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.searches.lock().clone()
    }

    fn targets(&self, name: &str) -> Vec<String> {
        match self.aliases.get(name) {
            Some(indices) => indices.iter().cloned().collect(),
            None => vec![name.to_string()],
        }
    }
}

#[async_trait]
impl SearchClient for InMemorySearchClient {
    async fn indices_behind_alias(&self, alias: &str) -> Result<Vec<String>, OrchestratorError> {
        Ok(self
            .aliases
            .get(alias)
            .map(|indices| indices.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, OrchestratorError> {
        Ok(self.indices.contains_key(index))
    }

    async fn create_index(&self, index: &str, body: Value) -> Result<(), OrchestratorError> {
        if self.indices.contains_key(index) {
            return Err(OrchestratorError::backend(format!(
                "Index '{}' already exists",
                index
            )));
        }
        self.indices.insert(index.to_string(), body);
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), OrchestratorError> {
        self.indices.remove(index);
        self.hits.remove(index);
        for mut alias in self.aliases.iter_mut() {
            alias.value_mut().remove(index);
        }
        self.aliases.retain(|_, indices| !indices.is_empty());
        Ok(())
    }

    async fn put_alias(&self, alias: &str, index: &str) -> Result<(), OrchestratorError> {
        if !self.indices.contains_key(index) {
            return Err(OrchestratorError::backend(format!(
                "Cannot alias '{}' to missing index '{}'",
                alias, index
            )));
        }
        self.aliases
            .entry(alias.to_string())
            .or_default()
            .insert(index.to_string());
        Ok(())
    }

    async fn remove_alias(&self, alias: &str, index: &str) -> Result<(), OrchestratorError> {
        if let Some(mut indices) = self.aliases.get_mut(alias) {
            indices.remove(index);
        }
        self.aliases.remove_if(alias, |_, indices| indices.is_empty());
        Ok(())
    }

    async fn execute_search(&self, index: &str, body: Value) -> Result<SearchResponse, OrchestratorError> {
        self.searches.lock().push(RecordedSearch {
            index: index.to_string(),
            body,
        });

        let hits: Vec<SearchHit> = self
            .targets(index)
            .iter()
            .filter_map(|target| self.hits.get(target).map(|h| h.value().clone()))
            .flatten()
            .collect();

        Ok(SearchResponse {
            total: hits.len() as u64,
            hits,
        })
    }
}
