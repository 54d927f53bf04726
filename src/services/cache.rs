use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::compatibility_cache_repo;
use crate::error::MatchError;
use crate::models::{CachedScore, ScoreBreakdown};

/// Deterministic ordering of a user pair so (a, b) and (b, a) share one
/// cache entry.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Memoization store for pair scores. Implementations key on the canonical
/// pair and report staleness explicitly: callers treat a stale entry as a
/// miss but can still tell it apart from an absent one.
///
/// No locking around concurrent writers; the calculators are deterministic,
/// so last-write-wins produces the same values.
#[async_trait]
pub trait ScoreCache: Send + Sync {
    async fn get(&self, user_a: &str, user_b: &str) -> Result<Option<CachedScore>, MatchError>;

    async fn put(
        &self,
        user_a: &str,
        user_b: &str,
        breakdown: &ScoreBreakdown,
    ) -> Result<(), MatchError>;

    async fn invalidate(&self, user_a: &str, user_b: &str) -> Result<(), MatchError>;

    /// Drop every entry touching one user, for profile edits that change
    /// scoring inputs.
    async fn invalidate_user(&self, user_id: &str) -> Result<u64, MatchError>;

    /// Delete entries older than the freshness window. Returns the number
    /// of entries removed.
    async fn sweep_expired(&self) -> Result<u64, MatchError>;
}

/// Production cache backed by the compatibility_scores table.
#[derive(Clone)]
pub struct SqliteScoreCache {
    pool: SqlitePool,
    ttl_days: i64,
}

impl SqliteScoreCache {
    pub fn new(pool: SqlitePool, ttl_days: i64) -> SqliteScoreCache {
        SqliteScoreCache { pool, ttl_days }
    }
}

#[async_trait]
impl ScoreCache for SqliteScoreCache {
    async fn get(&self, user_a: &str, user_b: &str) -> Result<Option<CachedScore>, MatchError> {
        let (a, b) = canonical_pair(user_a, user_b);
        let row = compatibility_cache_repo::get_score(&self.pool, a, b, self.ttl_days).await?;
        Ok(row.map(CachedScore::from))
    }

    async fn put(
        &self,
        user_a: &str,
        user_b: &str,
        breakdown: &ScoreBreakdown,
    ) -> Result<(), MatchError> {
        let (a, b) = canonical_pair(user_a, user_b);
        compatibility_cache_repo::upsert_score(&self.pool, a, b, breakdown).await?;
        Ok(())
    }

    async fn invalidate(&self, user_a: &str, user_b: &str) -> Result<(), MatchError> {
        let (a, b) = canonical_pair(user_a, user_b);
        compatibility_cache_repo::delete_pair(&self.pool, a, b).await?;
        Ok(())
    }

    async fn invalidate_user(&self, user_id: &str) -> Result<u64, MatchError> {
        Ok(compatibility_cache_repo::delete_user_pairs(&self.pool, user_id).await?)
    }

    async fn sweep_expired(&self) -> Result<u64, MatchError> {
        Ok(compatibility_cache_repo::sweep_expired(&self.pool, self.ttl_days).await?)
    }
}

/// In-memory cache for tests and table-less deployments.
pub struct MemoryScoreCache {
    ttl: Duration,
    entries: Mutex<HashMap<(String, String), (ScoreBreakdown, SystemTime)>>,
}

impl MemoryScoreCache {
    pub fn new(ttl: Duration) -> MemoryScoreCache {
        MemoryScoreCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(user_a: &str, user_b: &str) -> (String, String) {
        let (a, b) = canonical_pair(user_a, user_b);
        (a.to_string(), b.to_string())
    }
}

#[async_trait]
impl ScoreCache for MemoryScoreCache {
    async fn get(&self, user_a: &str, user_b: &str) -> Result<Option<CachedScore>, MatchError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(&Self::key(user_a, user_b))
            .map(|(breakdown, written_at)| {
                let age = written_at.elapsed().unwrap_or(Duration::ZERO);
                let epoch_secs = written_at
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::ZERO)
                    .as_secs();
                CachedScore {
                    breakdown: *breakdown,
                    calculated_at: epoch_secs.to_string(),
                    is_fresh: age <= self.ttl,
                }
            }))
    }

    async fn put(
        &self,
        user_a: &str,
        user_b: &str,
        breakdown: &ScoreBreakdown,
    ) -> Result<(), MatchError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(Self::key(user_a, user_b), (*breakdown, SystemTime::now()));
        Ok(())
    }

    async fn invalidate(&self, user_a: &str, user_b: &str) -> Result<(), MatchError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&Self::key(user_a, user_b));
        Ok(())
    }

    async fn invalidate_user(&self, user_id: &str) -> Result<u64, MatchError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(a, b), _| a != user_id && b != user_id);
        Ok((before - entries.len()) as u64)
    }

    async fn sweep_expired(&self) -> Result<u64, MatchError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, (_, written_at)| written_at.elapsed().unwrap_or(Duration::ZERO) <= ttl);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubScore;
    use crate::services::scoring::aggregator;

    fn breakdown(score: i64) -> ScoreBreakdown {
        aggregator::combine(Some(SubScore::new(score)), None)
    }

    #[test]
    fn canonical_pair_orders_lexicographically() {
        assert_eq!(canonical_pair("b", "a"), ("a", "b"));
        assert_eq!(canonical_pair("a", "b"), ("a", "b"));
        assert_eq!(canonical_pair("x", "x"), ("x", "x"));
    }

    #[tokio::test]
    async fn memory_cache_hits_both_pair_directions() {
        let cache = MemoryScoreCache::new(Duration::from_secs(60));
        cache.put("beta", "alpha", &breakdown(80)).await.unwrap();

        let hit = cache.get("alpha", "beta").await.unwrap().unwrap();
        assert_eq!(hit.breakdown.overall_score, 80);
        assert!(hit.is_fresh);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn memory_cache_put_overwrites() {
        let cache = MemoryScoreCache::new(Duration::from_secs(60));
        cache.put("a", "b", &breakdown(40)).await.unwrap();
        cache.put("b", "a", &breakdown(90)).await.unwrap();

        let hit = cache.get("a", "b").await.unwrap().unwrap();
        assert_eq!(hit.breakdown.overall_score, 90);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn memory_cache_reports_stale_entries() {
        let cache = MemoryScoreCache::new(Duration::ZERO);
        cache.put("a", "b", &breakdown(70)).await.unwrap();

        // TTL zero: present but immediately stale, not absent.
        let hit = cache.get("a", "b").await.unwrap().unwrap();
        assert!(!hit.is_fresh);

        assert_eq!(cache.sweep_expired().await.unwrap(), 1);
        assert!(cache.get("a", "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_cache_invalidates_per_user() {
        let cache = MemoryScoreCache::new(Duration::from_secs(60));
        cache.put("a", "b", &breakdown(70)).await.unwrap();
        cache.put("a", "c", &breakdown(70)).await.unwrap();
        cache.put("b", "c", &breakdown(70)).await.unwrap();

        assert_eq!(cache.invalidate_user("a").await.unwrap(), 2);
        assert!(cache.get("a", "b").await.unwrap().is_none());
        assert!(cache.get("b", "c").await.unwrap().is_some());
    }
}
