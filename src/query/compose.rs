// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Entry points composing a builder's output into a final query.

use tracing::{debug, instrument};

use super::ast::{BoolQuery, Query};
use super::builder::QueryBuilder;
use super::context::QueryBuilderContext;
use super::options::QueryOptions;
use super::source::SourceQuery;
use crate::client::SearchRequest;
use crate::error::QueryError;
use crate::metrics;

/// Run `builder` over a fresh context and combine the accumulators.
///
/// The result is always a compound query with the scored query under `must`
/// and the unscored filter under `filter`. Either may be match-all.
#[instrument(skip_all)]
pub async fn build_query<T, B>(
    builder: &B,
    source: &dyn SourceQuery,
    options: &QueryOptions,
    search: Option<&mut SearchRequest<T>>,
) -> Result<Query, QueryError>
where
    T: 'static,
    B: QueryBuilder<T> + ?Sized,
{
    let mut ctx = QueryBuilderContext::new(source, options, search);

    if let Err(e) = builder.build(&mut ctx).await {
        debug!(error = %e, "Query builder failed");
        metrics::record_query_build(false);
        return Err(e);
    }

    let (query, filter) = ctx.into_parts();
    metrics::record_query_build(true);

    Ok(Query::bool(BoolQuery {
        must: vec![query.root],
        filter: vec![filter.root],
        ..Default::default()
    }))
}

/// Build the query and install it on `search`.
///
/// Fails with [`QueryError::InvalidArgument`] when no search request is given.
pub async fn configure_search<T, B>(
    builder: &B,
    source: &dyn SourceQuery,
    options: &QueryOptions,
    search: Option<&mut SearchRequest<T>>,
) -> Result<(), QueryError>
where
    T: 'static,
    B: QueryBuilder<T> + ?Sized,
{
    let Some(search) = search else {
        return Err(QueryError::InvalidArgument {
            name: "search",
            reason: "a search request is required".to_string(),
        });
    };

    let query = build_query(builder, source, options, Some(&mut *search)).await?;
    search.set_query(query);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::QueryNode;
    use crate::query::builder::ChainedQueryBuilder;
    use crate::query::source::RepositoryQuery;
    use crate::query::visitors::SearchTextQueryBuilder;

    type Doc = serde_json::Value;

    #[tokio::test]
    async fn test_empty_builder_yields_match_all_parts() {
        let builder = ChainedQueryBuilder::<Doc>::new();
        let source = RepositoryQuery::new();
        let options = QueryOptions::new();

        let query = build_query(&builder, &source, &options, None::<&mut SearchRequest<Doc>>).await.unwrap();

        let QueryNode::Bool(b) = &query.root else {
            panic!("expected bool query, got {:?}", query);
        };
        assert_eq!(b.must, vec![QueryNode::MatchAll]);
        assert_eq!(b.filter, vec![QueryNode::MatchAll]);
        assert!(query.is_match_all());
    }

    #[tokio::test]
    async fn test_configure_search_requires_request() {
        let builder = ChainedQueryBuilder::<Doc>::new();
        let source = RepositoryQuery::new();
        let options = QueryOptions::new();

        let err = configure_search(&builder, &source, &options, None::<&mut SearchRequest<Doc>>).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { name: "search", .. }));
    }

    #[tokio::test]
    async fn test_configure_search_sets_query() {
        let builder = ChainedQueryBuilder::<Doc>::new().with(SearchTextQueryBuilder, 0);
        let source = RepositoryQuery::new().with_filter("status:active");
        let options = QueryOptions::new();
        let mut search = SearchRequest::<Doc>::new();

        configure_search(&builder, &source, &options, Some(&mut search)).await.unwrap();

        let expected = build_query(&builder, &source, &options, None::<&mut SearchRequest<Doc>>).await.unwrap();
        assert_eq!(search.query(), Some(&expected));
    }
}
