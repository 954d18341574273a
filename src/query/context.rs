// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder Context
//!
//! Per-compilation state handed to every query builder. One context is
//! created for each search request and dropped once the final query has been
//! composed.
//!
//! ```text
//! new(source, options, search)
//!     │
//!     ├─→ alias/include resolvers taken from options
//!     └─→ date window resolved once:
//!           source.date_ranges ──→ source.system_filter.date_ranges
//!           first range with use_date_range() wins → Data[StartDate/EndDate]
//!
//! builder.build(&mut ctx)   (visitors append to Query / Filter / Data)
//!
//! into_parts() → (Query, Filter)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::trace;

use super::ast::{Operator, Query};
use super::data::ContextData;
use super::options::{AliasResolver, IncludeResolver, QueryOptions};
use super::source::{DateRange, SourceQuery};
use crate::client::SearchRequest;
use crate::error::QueryError;

/// The single date window in effect for a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDateRange {
    pub field: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<&DateRange> for ResolvedDateRange {
    fn from(range: &DateRange) -> Self {
        Self {
            field: range.field.clone(),
            start: range.start_or_min(),
            end: range.end_or_default(),
        }
    }
}

enum SearchSlot<'a, T> {
    Borrowed(&'a mut SearchRequest<T>),
    Owned(SearchRequest<T>),
}

pub struct QueryBuilderContext<'a, T> {
    source: &'a dyn SourceQuery,
    options: &'a QueryOptions,
    search: SearchSlot<'a, T>,
    query: Query,
    filter: Query,
    data: ContextData,
    date_range: Option<ResolvedDateRange>,
    alias_resolver: Option<Arc<dyn AliasResolver>>,
    include_resolver: Option<Arc<dyn IncludeResolver>>,
    default_field: Option<String>,
    default_operator: Operator,
    use_scoring: bool,
}

impl<'a, T> QueryBuilderContext<'a, T> {
    /// Create a context for one compilation.
    ///
    /// When no search request is supplied the context starts from an empty one.
    pub fn new(
        source: &'a dyn SourceQuery,
        options: &'a QueryOptions,
        search: Option<&'a mut SearchRequest<T>>,
    ) -> Self {
        let search = match search {
            Some(search) => SearchSlot::Borrowed(search),
            None => SearchSlot::Owned(SearchRequest::new()),
        };

        let mut ctx = Self {
            source,
            options,
            search,
            query: Query::match_all(),
            filter: Query::match_all(),
            data: ContextData::new(),
            date_range: None,
            alias_resolver: options.alias_resolver.clone(),
            include_resolver: options.include_resolver.clone(),
            default_field: options.default_field.clone(),
            default_operator: options.default_operator,
            use_scoring: options.use_scoring,
        };

        if let Some(range) = first_date_range(source) {
            let resolved = ResolvedDateRange::from(range);
            trace!(field = %resolved.field, start = %resolved.start, end = %resolved.end, "Date window resolved");
            ctx.data.set_date_window(resolved.start, resolved.end);
            ctx.date_range = Some(resolved);
        }

        ctx
    }

    /// The caller's source query
    #[must_use]
    pub fn source(&self) -> &'a dyn SourceQuery {
        self.source
    }

    /// Source query as a concrete type, if it is one
    #[must_use]
    pub fn source_as<Q: 'static>(&self) -> Option<&'a Q> {
        self.source.as_any().downcast_ref()
    }

    #[must_use]
    pub fn options(&self) -> &'a QueryOptions {
        self.options
    }

    #[must_use]
    pub fn search(&self) -> &SearchRequest<T> {
        match &self.search {
            SearchSlot::Borrowed(search) => &**search,
            SearchSlot::Owned(search) => search,
        }
    }

    pub fn search_mut(&mut self) -> &mut SearchRequest<T> {
        match &mut self.search {
            SearchSlot::Borrowed(search) => &mut **search,
            SearchSlot::Owned(search) => search,
        }
    }

    /// Scored clauses accumulated so far
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Unscored clauses accumulated so far
    #[must_use]
    pub fn filter(&self) -> &Query {
        &self.filter
    }

    /// AND a scored clause onto the query accumulator
    pub fn add_query(&mut self, query: Query) {
        let previous = std::mem::take(&mut self.query);
        self.query = previous.and(query);
    }

    /// AND an unscored clause onto the filter accumulator
    pub fn add_filter(&mut self, filter: Query) {
        let previous = std::mem::take(&mut self.filter);
        self.filter = previous.and(filter);
    }

    #[must_use]
    pub fn data(&self) -> &ContextData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ContextData {
        &mut self.data
    }

    /// Date window resolved at construction
    #[must_use]
    pub fn date_range(&self) -> Option<&ResolvedDateRange> {
        self.date_range.as_ref()
    }

    #[must_use]
    pub fn alias_resolver(&self) -> Option<&Arc<dyn AliasResolver>> {
        self.alias_resolver.as_ref()
    }

    pub fn set_alias_resolver(&mut self, resolver: Option<Arc<dyn AliasResolver>>) {
        self.alias_resolver = resolver;
    }

    #[must_use]
    pub fn include_resolver(&self) -> Option<&Arc<dyn IncludeResolver>> {
        self.include_resolver.as_ref()
    }

    pub fn set_include_resolver(&mut self, resolver: Option<Arc<dyn IncludeResolver>>) {
        self.include_resolver = resolver;
    }

    /// Canonical path for `field`; unknown fields come back unchanged.
    #[must_use]
    pub fn resolve_field(&self, field: &str) -> String {
        self.alias_resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(field))
            .unwrap_or_else(|| field.to_string())
    }

    /// Expand a named include. `Ok(None)` when there's no resolver or no such include.
    pub async fn resolve_include(&self, name: &str) -> Result<Option<String>, QueryError> {
        match &self.include_resolver {
            Some(resolver) => resolver.resolve(name).await,
            None => Ok(None),
        }
    }

    #[must_use]
    pub fn default_field(&self) -> Option<&str> {
        self.default_field.as_deref()
    }

    pub fn set_default_field(&mut self, field: Option<String>) {
        self.default_field = field;
    }

    #[must_use]
    pub fn default_operator(&self) -> Operator {
        self.default_operator
    }

    pub fn set_default_operator(&mut self, operator: Operator) {
        self.default_operator = operator;
    }

    #[must_use]
    pub fn use_scoring(&self) -> bool {
        self.use_scoring
    }

    pub fn set_use_scoring(&mut self, use_scoring: bool) {
        self.use_scoring = use_scoring;
    }

    /// Consume the context, yielding `(query, filter)`
    pub fn into_parts(self) -> (Query, Query) {
        (self.query, self.filter)
    }
}

/// First applicable range: the source's own ranges, then the system filter's.
fn first_date_range(source: &dyn SourceQuery) -> Option<&DateRange> {
    let system = source.system_filter();
    source
        .date_ranges()
        .iter()
        .chain(system.into_iter().flat_map(|s| s.date_ranges().iter()))
        .find(|range| range.use_date_range())
}
