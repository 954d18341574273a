//! Caller-supplied source queries.
//!
//! A source query is the abstract, engine-neutral description of what the
//! caller wants. Visitors downcast it to the concrete type they understand via
//! [`QueryBuilderContext::source_as`](super::QueryBuilderContext::source_as).

use std::any::Any;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Abstract query handed to the query builders.
pub trait SourceQuery: Send + Sync {
    /// Date ranges carried by this query, in declaration order
    fn date_ranges(&self) -> &[DateRange] {
        &[]
    }

    /// System-applied filter wrapped around the user's query, if any
    fn system_filter(&self) -> Option<&dyn SourceQuery> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Time window restricting a date field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub field: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(
        field: impl Into<String>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            field: field.into(),
            start_date,
            end_date,
        }
    }

    /// A range applies once it names a field and has at least one bound.
    #[must_use]
    pub fn use_date_range(&self) -> bool {
        !self.field.is_empty() && (self.start_date.is_some() || self.end_date.is_some())
    }

    /// Start bound, open start treated as 0001-01-01.
    #[must_use]
    pub fn start_or_min(&self) -> DateTime<Utc> {
        self.start_date.unwrap_or_else(earliest_date)
    }

    /// End bound, open end treated as one hour from now.
    #[must_use]
    pub fn end_or_default(&self) -> DateTime<Utc> {
        self.end_date.unwrap_or_else(|| Utc::now() + Duration::hours(1))
    }
}

/// Earliest start a window resolves to; still representable in RFC 3339.
pub fn earliest_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Repository-style source query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryQuery {
    /// Filter expression (unscored)
    pub filter: Option<String>,
    /// Search expression (scored)
    pub search: Option<String>,
    /// Restrict to these document ids
    pub ids: Vec<String>,
    pub date_ranges: Vec<DateRange>,
    /// Filter applied by the system on top of the caller's query
    pub system_filter: Option<Box<RepositoryQuery>>,
}

impl RepositoryQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_ranges.push(range);
        self
    }

    #[must_use]
    pub fn with_system_filter(mut self, system_filter: RepositoryQuery) -> Self {
        self.system_filter = Some(Box::new(system_filter));
        self
    }
}

impl SourceQuery for RepositoryQuery {
    fn date_ranges(&self) -> &[DateRange] {
        &self.date_ranges
    }

    fn system_filter(&self) -> Option<&dyn SourceQuery> {
        self.system_filter
            .as_deref()
            .map(|q| q as &dyn SourceQuery)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_date_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert!(DateRange::new("created", Some(start), None).use_date_range());
        assert!(DateRange::new("created", None, Some(start)).use_date_range());
        assert!(!DateRange::new("created", None, None).use_date_range());
        assert!(!DateRange::new("", Some(start), None).use_date_range());
    }

    #[test]
    fn test_open_bounds() {
        let range = DateRange::new("created", None, None);
        assert_eq!(range.start_or_min(), earliest_date());
        assert_eq!(range.start_or_min().to_rfc3339(), "0001-01-01T00:00:00+00:00");
        assert!(range.end_or_default() > Utc::now());
    }

    #[test]
    fn test_system_filter_is_exposed() {
        let query = RepositoryQuery::new()
            .with_filter("status:active")
            .with_system_filter(RepositoryQuery::new().with_filter("tenant:1"));

        let system = query.system_filter().unwrap();
        let system = system.as_any().downcast_ref::<RepositoryQuery>().unwrap();
        assert_eq!(system.filter.as_deref(), Some("tenant:1"));
        assert!(RepositoryQuery::new().system_filter().is_none());
    }
}
