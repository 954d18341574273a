// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query builders
//!
//! A [`QueryBuilder`] is a visitor over the [`QueryBuilderContext`]. It reads
//! the source query and options, then appends to the query and filter
//! accumulators or the data side-channel. Builders are composed with
//! [`ChainedQueryBuilder`], which runs them in ascending priority order.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::context::QueryBuilderContext;
use crate::error::QueryError;

/// Visitor contributing clauses to a query compilation.
///
/// `T` is the document type of the search request being built.
#[async_trait]
pub trait QueryBuilder<T: 'static>: Send + Sync {
    async fn build(&self, ctx: &mut QueryBuilderContext<'_, T>) -> Result<(), QueryError>;
}

#[async_trait]
impl<T: 'static, B: QueryBuilder<T> + ?Sized> QueryBuilder<T> for Arc<B> {
    async fn build(&self, ctx: &mut QueryBuilderContext<'_, T>) -> Result<(), QueryError> {
        (**self).build(ctx).await
    }
}

struct Registered<T> {
    priority: i32,
    builder: Arc<dyn QueryBuilder<T>>,
}

/// Runs registered builders in ascending priority.
///
/// Builders with equal priority run in registration order. The first error
/// stops the chain.
pub struct ChainedQueryBuilder<T> {
    builders: Vec<Registered<T>>,
}

impl<T: 'static> ChainedQueryBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builders: Vec::new(),
        }
    }

    pub fn register(&mut self, builder: impl QueryBuilder<T> + 'static, priority: i32) {
        let position = self
            .builders
            .iter()
            .position(|b| b.priority > priority)
            .unwrap_or(self.builders.len());
        self.builders.insert(
            position,
            Registered {
                priority,
                builder: Arc::new(builder),
            },
        );
    }

    #[must_use]
    pub fn with(mut self, builder: impl QueryBuilder<T> + 'static, priority: i32) -> Self {
        self.register(builder, priority);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl<T: 'static> Default for ChainedQueryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChainedQueryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let priorities: Vec<i32> = self.builders.iter().map(|b| b.priority).collect();
        f.debug_struct("ChainedQueryBuilder")
            .field("priorities", &priorities)
            .finish()
    }
}

#[async_trait]
impl<T: 'static> QueryBuilder<T> for ChainedQueryBuilder<T> {
    async fn build(&self, ctx: &mut QueryBuilderContext<'_, T>) -> Result<(), QueryError> {
        for registered in &self.builders {
            trace!(priority = registered.priority, "Running query builder");
            registered.builder.build(ctx).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::Query;
    use crate::query::options::QueryOptions;
    use crate::query::source::RepositoryQuery;
    use serde_json::json;

    type Doc = serde_json::Value;

    struct Tag(&'static str);

    #[async_trait]
    impl QueryBuilder<Doc> for Tag {
        async fn build(&self, ctx: &mut QueryBuilderContext<'_, Doc>) -> Result<(), QueryError> {
            let mut seen = ctx
                .data()
                .get("order")
                .and_then(|v| v.as_array().cloned())
                .unwrap_or_default();
            seen.push(json!(self.0));
            ctx.data_mut().insert("order", json!(seen));
            ctx.add_filter(Query::field_eq("tag", self.0));
            Ok(())
        }
    }

    struct Fail;

    #[async_trait]
    impl QueryBuilder<Doc> for Fail {
        async fn build(&self, _ctx: &mut QueryBuilderContext<'_, Doc>) -> Result<(), QueryError> {
            Err(QueryError::builder("boom"))
        }
    }

    #[tokio::test]
    async fn test_runs_in_priority_order() {
        let chain = ChainedQueryBuilder::new()
            .with(Tag("late"), 100)
            .with(Tag("early"), -10)
            .with(Tag("middle-a"), 0)
            .with(Tag("middle-b"), 0);

        let source = RepositoryQuery::new();
        let options = QueryOptions::new();
        let mut ctx = QueryBuilderContext::<Doc>::new(&source, &options, None);
        chain.build(&mut ctx).await.unwrap();

        assert_eq!(
            ctx.data().get("order"),
            Some(&json!(["early", "middle-a", "middle-b", "late"]))
        );
    }

    #[tokio::test]
    async fn test_first_error_stops_chain() {
        let chain = ChainedQueryBuilder::new()
            .with(Tag("before"), 0)
            .with(Fail, 1)
            .with(Tag("after"), 2);

        let source = RepositoryQuery::new();
        let options = QueryOptions::new();
        let mut ctx = QueryBuilderContext::<Doc>::new(&source, &options, None);
        let err = chain.build(&mut ctx).await.unwrap_err();

        assert!(matches!(err, QueryError::Builder(_)));
        assert_eq!(ctx.data().get("order"), Some(&json!(["before"])));
    }

    #[tokio::test]
    async fn test_empty_chain_leaves_match_all() {
        let chain = ChainedQueryBuilder::<Doc>::default();
        assert!(chain.is_empty());

        let source = RepositoryQuery::new();
        let options = QueryOptions::new();
        let mut ctx = QueryBuilderContext::<Doc>::new(&source, &options, None);
        chain.build(&mut ctx).await.unwrap();

        let (query, filter) = ctx.into_parts();
        assert!(query.is_match_all());
        assert!(filter.is_match_all());
    }
}
