//! Usage counters for the translation façade

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Process-lifetime usage counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Texts handed to the façade
    pub requests: u64,
    /// Texts answered by the same-language short-circuit
    pub same_language: u64,
    /// Texts answered from the cache
    pub cache_hits: u64,
    /// Backend invocations (one per batch, including retries)
    pub backend_calls: u64,
    /// Texts answered with the original text because something failed
    pub fallbacks: u64,
    pub started_at: DateTime<Utc>,
}

impl UsageStats {
    pub fn new() -> Self {
        Self {
            requests: 0,
            same_language: 0,
            cache_hits: 0,
            backend_calls: 0,
            fallbacks: 0,
            started_at: Utc::now(),
        }
    }

    /// Share of requests that fell back to the original text
    pub fn fallback_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.fallbacks as f64 / self.requests as f64
    }
}

impl Default for UsageStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, cloneable handle over [`UsageStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    usage: Arc<RwLock<UsageStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_requests(&self, count: usize) {
        self.usage.write().await.requests += count as u64;
    }

    pub async fn record_same_language(&self, count: usize) {
        self.usage.write().await.same_language += count as u64;
    }

    pub async fn record_cache_hits(&self, count: usize) {
        self.usage.write().await.cache_hits += count as u64;
    }

    pub async fn record_backend_call(&self) {
        let mut usage = self.usage.write().await;
        usage.backend_calls += 1;
        debug!("Backend call #{}", usage.backend_calls);
    }

    pub async fn record_fallbacks(&self, count: usize) {
        self.usage.write().await.fallbacks += count as u64;
    }

    /// Get current usage statistics
    pub async fn get_stats(&self) -> UsageStats {
        self.usage.read().await.clone()
    }

    /// Reset counters (for testing or manual reset)
    pub async fn reset(&self) {
        let mut usage = self.usage.write().await;
        *usage = UsageStats::new();
        info!("Usage statistics reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_tracker() {
        let tracker = StatsTracker::new();

        tracker.record_requests(4).await;
        tracker.record_same_language(1).await;
        tracker.record_cache_hits(1).await;
        tracker.record_backend_call().await;
        tracker.record_fallbacks(1).await;

        let stats = tracker.get_stats().await;
        assert_eq!(stats.requests, 4);
        assert_eq!(stats.same_language, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.backend_calls, 1);
        assert_eq!(stats.fallbacks, 1);
        assert!((stats.fallback_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_reset() {
        let tracker = StatsTracker::new();
        tracker.record_requests(3).await;
        tracker.reset().await;

        let stats = tracker.get_stats().await;
        assert_eq!(stats.requests, 0);
        assert_eq!(stats.fallback_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let tracker = StatsTracker::new();
        let clone = tracker.clone();

        tokio_test::block_on(async {
            clone.record_requests(2).await;
            assert_eq!(tracker.get_stats().await.requests, 2);
        });
    }
}
