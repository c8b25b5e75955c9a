//! Report result caching using Moka.
//!
//! Reports are pure functions of a ledger snapshot, so results are keyed by
//! the ledger version that produced them. A commit bumps the version and
//! older entries simply stop being asked for; the TTL reclaims them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache for rendered reports.
#[derive(Clone)]
pub struct ReportCache {
    cache: Cache<String, Arc<Value>>,
}

impl ReportCache {
    /// Creates a report cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a report cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { cache }
    }

    /// Returns the cached report for `key` at `version`, rendering it on a miss.
    ///
    /// Failed renders are not cached.
    pub async fn get_or_render<F, Fut, E>(
        &self,
        version: u64,
        key: &str,
        render: F,
    ) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let cache_key = format!("{version}:{key}");
        if let Some(hit) = self.cache.get(&cache_key).await {
            return Ok(hit);
        }
        let value = Arc::new(render().await?);
        self.cache.insert(cache_key, Arc::clone(&value)).await;
        Ok(value)
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_hit_skips_render() {
        let cache = ReportCache::new();
        let renders = AtomicUsize::new(0);
        for _ in 0..3 {
            let value = cache
                .get_or_render(1, "tb", || async {
                    renders.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(json!({"total": "10.00"}))
                })
                .await
                .unwrap();
            assert_eq!(value["total"], "10.00");
        }
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_new_version_renders_again() {
        let cache = ReportCache::new();
        let first = cache
            .get_or_render(1, "tb", || async { Ok::<_, ()>(json!(1)) })
            .await
            .unwrap();
        let second = cache
            .get_or_render(2, "tb", || async { Ok::<_, ()>(json!(2)) })
            .await
            .unwrap();
        assert_eq!(*first, json!(1));
        assert_eq!(*second, json!(2));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = ReportCache::new();
        let failed = cache
            .get_or_render(1, "cf", || async { Err::<Value, _>("boom") })
            .await;
        assert_eq!(failed, Err("boom"));
        let ok = cache
            .get_or_render(1, "cf", || async { Ok::<_, &str>(json!("ok")) })
            .await
            .unwrap();
        assert_eq!(*ok, json!("ok"));

        cache.invalidate_all();
        cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 0);
    }
}
