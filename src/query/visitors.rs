// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Stock query builders for [`RepositoryQuery`] sources.

use async_trait::async_trait;

use super::ast::{Query, QueryNode, QueryStringQuery};
use super::builder::QueryBuilder;
use super::context::QueryBuilderContext;
use super::source::RepositoryQuery;
use crate::error::QueryError;

/// Prefix marking a named include inside a query string
pub const INCLUDE_PREFIX: &str = "@include:";

/// Filters on the context's resolved date window.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeQueryBuilder;

#[async_trait]
impl<T: 'static> QueryBuilder<T> for DateRangeQueryBuilder {
    async fn build(&self, ctx: &mut QueryBuilderContext<'_, T>) -> Result<(), QueryError> {
        let Some(range) = ctx.date_range().cloned() else {
            return Ok(());
        };
        let field = ctx.resolve_field(&range.field);
        ctx.add_filter(Query::date_range(field, Some(range.start), Some(range.end)));
        Ok(())
    }
}

/// Turns a repository query's text expressions and ids into clauses.
///
/// - `search` becomes a scored query string (or a filter when scoring is off)
/// - `filter`, and the system filter's `filter`, become unscored query strings
/// - `ids` become a terms filter on `id`
///
/// Query strings are rewritten before use: `@include:name` tokens are
/// replaced by the named include, and `field:value` terms have their field
/// resolved through the alias resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchTextQueryBuilder;

#[async_trait]
impl<T: 'static> QueryBuilder<T> for SearchTextQueryBuilder {
    async fn build(&self, ctx: &mut QueryBuilderContext<'_, T>) -> Result<(), QueryError> {
        let Some(source) = ctx.source_as::<RepositoryQuery>() else {
            return Ok(());
        };

        if let Some(filter) = non_blank(source.filter.as_deref()) {
            let query = query_string(ctx, filter).await?;
            ctx.add_filter(query);
        }

        if let Some(system) = source.system_filter.as_deref() {
            if let Some(filter) = non_blank(system.filter.as_deref()) {
                let query = query_string(ctx, filter).await?;
                ctx.add_filter(query);
            }
        }

        if let Some(search) = non_blank(source.search.as_deref()) {
            let query = query_string(ctx, search).await?;
            if ctx.use_scoring() {
                ctx.add_query(query);
            } else {
                ctx.add_filter(query);
            }
        }

        if !source.ids.is_empty() {
            let field = ctx.resolve_field("id");
            ctx.add_filter(Query::tags(field, source.ids.clone()));
        }

        Ok(())
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

async fn query_string<T>(
    ctx: &QueryBuilderContext<'_, T>,
    text: &str,
) -> Result<Query, QueryError> {
    let expanded = expand(ctx, text).await?;
    Ok(Query::new(QueryNode::QueryString(QueryStringQuery {
        query: expanded,
        default_field: ctx.default_field().map(|f| ctx.resolve_field(f)),
        default_operator: ctx.default_operator(),
    })))
}

/// Single pass: text pulled in by an include is not expanded again.
///
/// Whitespace and quoted phrases are copied through untouched.
async fn expand<T>(ctx: &QueryBuilderContext<'_, T>, text: &str) -> Result<String, QueryError> {
    let mut expanded = String::with_capacity(text.len());

    for segment in segments(text) {
        match segment {
            Segment::Space(space) => expanded.push_str(space),
            Segment::Term(term) => expanded.push_str(&rewrite_term(ctx, term).await?),
        }
    }

    Ok(expanded)
}

enum Segment<'t> {
    Space(&'t str),
    Term(&'t str),
}

/// Split on whitespace outside double quotes, keeping the whitespace runs.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut current = None;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        let is_space = !in_quotes && c.is_whitespace();

        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        }

        if current != Some(is_space) {
            if let Some(space) = current {
                segments.push(segment(space, &text[start..i]));
            }
            start = i;
            current = Some(is_space);
        }
    }
    if let Some(space) = current {
        segments.push(segment(space, &text[start..]));
    }

    segments
}

fn segment(space: bool, text: &str) -> Segment<'_> {
    if space {
        Segment::Space(text)
    } else {
        Segment::Term(text)
    }
}

async fn rewrite_term<T>(ctx: &QueryBuilderContext<'_, T>, term: &str) -> Result<String, QueryError> {
    let body = term.trim_start_matches(['-', '+', '(']);
    let lead = &term[..term.len() - body.len()];

    if let Some(rest) = body.strip_prefix(INCLUDE_PREFIX) {
        let name = rest.trim_end_matches(')');
        let trail = &rest[name.len()..];
        return match ctx.resolve_include(name).await? {
            Some(included) => Ok(format!("{}({}){}", lead, included, trail)),
            None => Err(QueryError::Include {
                name: name.to_string(),
                reason: "unknown include".to_string(),
            }),
        };
    }

    match body.split_once(':') {
        Some((field, value)) if is_field_name(field) => {
            Ok(format!("{}{}:{}", lead, ctx.resolve_field(field), value))
        }
        _ => Ok(term.to_string()),
    }
}

/// A quoted or escaped prefix is phrase text, not a field.
fn is_field_name(field: &str) -> bool {
    !field.is_empty() && !field.contains(['"', '\\', '(', ')'])
}
