//! Side-channel data shared between visitors.
//!
//! An open string-keyed map. Keys are chosen by visitor authors, except for
//! the reserved [`START_DATE`] and [`END_DATE`] keys which the context fills
//! with the resolved date window before any visitor runs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Reserved key: start of the resolved date window
pub const START_DATE: &str = "StartDate";
/// Reserved key: end of the resolved date window
pub const END_DATE: &str = "EndDate";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextData {
    values: HashMap<String, Value>,
}

impl ContextData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    #[must_use]
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.date(START_DATE)
    }

    #[must_use]
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.date(END_DATE)
    }

    pub fn set_date_window(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.values.insert(START_DATE.to_string(), Value::String(start.to_rfc3339()));
        self.values.insert(END_DATE.to_string(), Value::String(end.to_rfc3339()));
    }

    fn date(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.values.get(key)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_date_window_round_trip() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();

        let mut data = ContextData::new();
        assert!(data.start_date().is_none());

        data.set_date_window(start, end);
        assert_eq!(data.start_date(), Some(start));
        assert_eq!(data.end_date(), Some(end));
        assert!(data.contains_key(START_DATE));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_open_keys() {
        let mut data = ContextData::new();
        assert!(data.insert("tenant", json!("acme")).is_none());
        assert_eq!(data.insert("tenant", json!("globex")), Some(json!("acme")));
        assert_eq!(data.get("tenant"), Some(&json!("globex")));
        assert_eq!(data.remove("tenant"), Some(json!("globex")));
        assert!(data.is_empty());
    }

    #[test]
    fn test_non_date_value_under_reserved_key() {
        let mut data = ContextData::new();
        data.insert(START_DATE, json!(42));
        assert!(data.start_date().is_none());
    }
}
