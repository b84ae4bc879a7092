//! Query cache
//!
//! Plain key to JSON store. Entries are written only by completed fetches
//! and removed only by invalidation; nothing writes into it speculatively.
//! When two fetches for one key overlap, the one that finishes last wins.

use super::keys::{QueryKey, Scope};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded value for `key`. An entry that no longer decodes as `T` is
    /// treated as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.entries.get(key)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Cached value for {:?} did not decode: {}", key, e);
                None
            }
        }
    }

    pub fn put<T: Serialize>(&mut self, key: QueryKey, value: &T) -> Result<()> {
        let entry = CacheEntry {
            value: serde_json::to_value(value)?,
            fetched_at: Utc::now(),
        };
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.fetched_at)
    }

    /// Drop every entry whose key belongs to one of `scopes`. Returns how
    /// many entries went.
    pub fn invalidate_scopes(&mut self, scopes: &[Scope]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !scopes.contains(&key.scope()));
        before - self.entries.len()
    }

    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_put_then_get() {
        let mut cache = QueryCache::new();
        cache.put(QueryKey::Classes, &json!([{ "name": "2A" }])).unwrap();

        let value: Value = cache.get(&QueryKey::Classes).unwrap();

        assert_eq!(value[0]["name"], "2A");
        assert!(cache.fetched_at(&QueryKey::Classes).is_some());
    }

    #[test]
    fn test_null_is_a_cached_value() {
        let mut cache = QueryCache::new();
        let key = QueryKey::WeekByNumber {
            year: 2025,
            week_number: 53,
        };
        cache.put(key.clone(), &Option::<String>::None).unwrap();

        let hit: Option<Option<String>> = cache.get(&key);

        assert_eq!(hit, Some(None));
    }

    #[test]
    fn test_later_write_wins() {
        let mut cache = QueryCache::new();
        cache.put(QueryKey::Staff, &json!(["first"])).unwrap();
        cache.put(QueryKey::Staff, &json!(["second"])).unwrap();

        let value: Value = cache.get(&QueryKey::Staff).unwrap();
        assert_eq!(value, json!(["second"]));
    }

    #[test]
    fn test_invalidate_scopes_only_touches_listed_scopes() {
        let mut cache = QueryCache::new();
        let week_id = Uuid::new_v4();
        cache.put(QueryKey::Day { week_id, weekday: 0 }, &json!({})).unwrap();
        cache.put(QueryKey::Day { week_id, weekday: 1 }, &json!({})).unwrap();
        cache.put(QueryKey::Warnings { week_id }, &json!({})).unwrap();
        cache.put(QueryKey::Students, &json!([])).unwrap();

        let dropped = cache.invalidate_scopes(&[Scope::Day, Scope::Warnings]);

        assert_eq!(dropped, 3);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&QueryKey::Students));
    }

    #[test]
    fn test_mistyped_entry_is_a_miss() {
        let mut cache = QueryCache::new();
        cache.put(QueryKey::Students, &json!("not a list")).unwrap();

        let hit: Option<Vec<String>> = cache.get(&QueryKey::Students);

        assert!(hit.is_none());
    }
}
