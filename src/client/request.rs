// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::OrchestratorError;
use crate::query::{DslTranslator, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

/// Search request for documents of type `T`.
///
/// The query is installed by [`configure_search`](crate::query::configure_search);
/// paging and sorting are set by the caller.
pub struct SearchRequest<T> {
    query: Option<Query>,
    from: Option<usize>,
    size: Option<usize>,
    sort: Vec<SortField>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> SearchRequest<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: None,
            from: None,
            size: None,
            sort: Vec::new(),
            _doc: PhantomData,
        }
    }

    #[must_use]
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn set_query(&mut self, query: Query) {
        self.query = Some(query);
    }

    #[must_use]
    pub fn from(&self) -> Option<usize> {
        self.from
    }

    pub fn set_from(&mut self, from: usize) {
        self.from = Some(from);
    }

    #[must_use]
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = Some(size);
    }

    #[must_use]
    pub fn sort(&self) -> &[SortField] {
        &self.sort
    }

    pub fn add_sort(&mut self, field: impl Into<String>, order: SortOrder) {
        self.sort.push(SortField {
            field: field.into(),
            order,
        });
    }

    #[must_use]
    pub fn with_page(mut self, from: usize, size: usize) -> Self {
        self.from = Some(from);
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.add_sort(field, order);
        self
    }

    /// Render the request body. A request without a query matches everything.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let query = match &self.query {
            Some(query) => DslTranslator::translate(query),
            None => DslTranslator::translate(&Query::match_all()),
        };

        let mut body = Map::new();
        body.insert("query".into(), query);
        if let Some(from) = self.from {
            body.insert("from".into(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".into(), json!(size));
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|s| {
                    let mut entry = Map::new();
                    entry.insert(s.field.clone(), json!({ "order": s.order }));
                    Value::Object(entry)
                })
                .collect();
            body.insert("sort".into(), Value::Array(sort));
        }
        Value::Object(body)
    }
}

impl<T> Default for SearchRequest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SearchRequest<T> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            from: self.from,
            size: self.size,
            sort: self.sort.clone(),
            _doc: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SearchRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("query", &self.query)
            .field("from", &self.from)
            .field("size", &self.size)
            .field("sort", &self.sort)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    /// Concrete index the hit came from
    pub index: String,
    pub score: Option<f64>,
    pub source: Value,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, index: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            index: index.into(),
            score: None,
            source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

impl SearchResponse {
    /// Decode every hit's source as `T`
    pub fn documents<T: DeserializeOwned>(&self) -> Result<Vec<T>, OrchestratorError> {
        self.hits
            .iter()
            .map(|hit| {
                serde_json::from_value(hit.source.clone()).map_err(|e| {
                    OrchestratorError::backend(format!("Failed to decode hit '{}': {}", hit.id, e))
                })
            })
            .collect()
    }
}
