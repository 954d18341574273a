//! Query options and resolution hooks.
//!
//! Options are read-only input to a query compilation. Besides the defaults
//! visitors should apply, they can carry two hooks:
//!
//! - an [`AliasResolver`] mapping a short field alias (`created`) to its
//!   canonical path (`data.created_utc`)
//! - an [`IncludeResolver`] expanding a named saved query into its text

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::ast::Operator;
use crate::error::QueryError;

/// Maps field aliases to canonical field paths.
pub trait AliasResolver: Send + Sync {
    /// Canonical path for `field`, or `None` when it isn't an alias
    fn resolve(&self, field: &str) -> Option<String>;
}

/// Expands named saved queries.
#[async_trait]
pub trait IncludeResolver: Send + Sync {
    /// Query text for `name`, or `None` when no such include exists
    async fn resolve(&self, name: &str) -> Result<Option<String>, QueryError>;
}

/// Alias resolver backed by a fixed map.
///
/// A dotted field whose first segment is an alias is resolved segment-wise:
/// with `data → idx`, `data.created` becomes `idx.created`.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    aliases: HashMap<String, String>,
}

impl AliasMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, field: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), field.into());
        self
    }
}

impl AliasResolver for AliasMap {
    fn resolve(&self, field: &str) -> Option<String> {
        if let Some(resolved) = self.aliases.get(field) {
            return Some(resolved.clone());
        }
        let (head, rest) = field.split_once('.')?;
        self.aliases
            .get(head)
            .map(|resolved| format!("{}.{}", resolved, rest))
    }
}

/// Include resolver backed by a fixed map.
#[derive(Debug, Clone, Default)]
pub struct IncludeMap {
    includes: HashMap<String, String>,
}

impl IncludeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, query: impl Into<String>) -> Self {
        self.includes.insert(name.into(), query.into());
        self
    }
}

#[async_trait]
impl IncludeResolver for IncludeMap {
    async fn resolve(&self, name: &str) -> Result<Option<String>, QueryError> {
        Ok(self.includes.get(name).cloned())
    }
}

/// Caller-supplied options for one query compilation.
#[derive(Clone, Default)]
pub struct QueryOptions {
    pub alias_resolver: Option<Arc<dyn AliasResolver>>,
    pub include_resolver: Option<Arc<dyn IncludeResolver>>,
    /// Field used by query strings that don't name one
    pub default_field: Option<String>,
    pub default_operator: Operator,
    /// Whether visitors should place clauses where they affect scoring
    pub use_scoring: bool,
    /// Free-form options for visitors
    pub values: HashMap<String, Value>,
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_alias_resolver(mut self, resolver: impl AliasResolver + 'static) -> Self {
        self.alias_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn with_include_resolver(mut self, resolver: impl IncludeResolver + 'static) -> Self {
        self.include_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, use_scoring: bool) -> Self {
        self.use_scoring = use_scoring;
        self
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("alias_resolver", &self.alias_resolver.is_some())
            .field("include_resolver", &self.include_resolver.is_some())
            .field("default_field", &self.default_field)
            .field("default_operator", &self.default_operator)
            .field("use_scoring", &self.use_scoring)
            .field("values", &self.values)
            .finish()
    }
}
