use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    stored_at: DateTime<Utc>,
}

/// Response bodies memoized per request URL for a fixed time-to-live.
///
/// Shared by concurrent fetches; entries are written once per key per window.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

/// `ttl_seconds` as a chrono duration, or `None` when it does not fit.
fn ttl_duration(ttl_seconds: u64) -> Option<Duration> {
    i64::try_from(ttl_seconds).ok().and_then(Duration::try_seconds)
}

impl ResponseCache {
    /// Out-of-range TTLs saturate to the longest representable duration.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: ttl_duration(ttl_seconds).unwrap_or(Duration::max_value()),
        }
    }

    pub fn get(&self, url: &str) -> Option<String> {
        self.get_at(url, Utc::now())
    }

    fn get_at(&self, url: &str, now: DateTime<Utc>) -> Option<String> {
        let fresh = {
            let entry = self.entries.get(url)?;
            (now.signed_duration_since(entry.stored_at) < self.ttl).then(|| entry.body.clone())
        };
        if fresh.is_none() {
            self.entries.remove(url);
        }
        fresh
    }

    pub fn insert(&self, url: &str, body: String) {
        self.insert_at(url, body, Utc::now());
    }

    fn insert_at(&self, url: &str, body: String, now: DateTime<Utc>) {
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                body,
                stored_at: now,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache = ResponseCache::new(300);
        let start = Utc::now();
        cache.insert_at("https://api.github.com/x", "body".into(), start);

        let within = start + Duration::seconds(299);
        assert_eq!(cache.get_at("https://api.github.com/x", within).as_deref(), Some("body"));

        let after = start + Duration::seconds(300);
        assert!(cache.get_at("https://api.github.com/x", after).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unknown_url_misses() {
        let cache = ResponseCache::new(300);
        assert!(cache.get("https://api.github.com/none").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_panicking() {
        assert!(ttl_duration(u64::MAX).is_none());
        assert!(ttl_duration(i64::MAX as u64).is_none());
        assert_eq!(ttl_duration(300), Some(Duration::seconds(300)));

        let cache = ResponseCache::new(u64::MAX);
        let start = Utc::now();
        cache.insert_at("https://api.github.com/x", "body".into(), start);
        let much_later = start + Duration::days(365 * 100);
        assert_eq!(cache.get_at("https://api.github.com/x", much_later).as_deref(), Some("body"));
    }
}
