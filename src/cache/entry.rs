//! Serializable cache entry: a resource collection with its capture and
//! expiry timestamps.
//!
//! The on-disk format is plain JSON with no version field; a file that no
//! longer decodes is treated as absent and rebuilt from upstream.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// A fetched collection and the window during which it may be served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub items: Vec<T>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Entry captured at `cached_at`, expiring `ttl` later.
    pub fn new(items: Vec<T>, cached_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| cached_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            items,
            cached_at,
            expires_at,
        }
    }

    /// True while `now` is strictly before the expiry instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

impl<T: Serialize> CacheEntry<T> {
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec_pretty(self).map_err(|e| CacheError::Encode(e.to_string()))
    }
}

impl<T: DeserializeOwned> CacheEntry<T> {
    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Cluster;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_expiry_is_cached_at_plus_ttl() {
        let cached_at = at("2024-01-01T00:00:00Z");
        let entry = CacheEntry::new(vec![1, 2, 3], cached_at, Duration::from_secs(3600));

        assert_eq!(entry.expires_at, at("2024-01-01T01:00:00Z"));
        assert!(entry.expires_at > entry.cached_at);
    }

    #[test]
    fn test_validity_window() {
        let cached_at = at("2024-01-01T00:00:00Z");
        let entry = CacheEntry::new(vec!["a"], cached_at, Duration::from_secs(60));

        assert!(entry.is_valid_at(cached_at));
        assert!(entry.is_valid_at(at("2024-01-01T00:00:59Z")));
        assert!(!entry.is_valid_at(at("2024-01-01T00:01:00Z")));
        assert!(!entry.is_valid_at(at("2024-01-02T00:00:00Z")));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new(Vec::<u8>::new(), Utc::now(), Duration::MAX);
        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(entry.is_valid());
    }

    #[test]
    fn test_roundtrip_with_clusters() {
        let entry = CacheEntry::new(
            vec![
                Cluster::new("in-cluster", "https://kubernetes.default.svc"),
                Cluster::new("prod", "https://prod.example.com"),
            ],
            Utc::now(),
            Duration::from_secs(600),
        );

        let decoded: CacheEntry<Cluster> = CacheEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_roundtrip_empty_items() {
        let entry: CacheEntry<Cluster> = CacheEntry::new(Vec::new(), Utc::now(), Duration::from_secs(1));
        let decoded: CacheEntry<Cluster> = CacheEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_file_format() {
        let json = r#"{
            "items": [],
            "cached_at": "2024-01-01T00:00:00Z",
            "expires_at": "2024-01-01T01:00:00Z"
        }"#;

        let entry: CacheEntry<Cluster> = CacheEntry::decode(json.as_bytes()).unwrap();
        assert_eq!(entry.cached_at, at("2024-01-01T00:00:00Z"));
        assert_eq!(entry.expires_at, at("2024-01-01T01:00:00Z"));
    }

    #[test]
    fn test_decode_garbage() {
        let result = CacheEntry::<Cluster>::decode(b"{not json");
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }
}
