use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::profile_repo;
use crate::error::MatchError;
use crate::models::{CachedScore, ScoreBreakdown, SubScore, UserProfileRow};
use crate::services::cache::{canonical_pair, ScoreCache};
use crate::services::scoring::aggregator;

/// Detailed pair breakdown returned by the "why did we match" endpoint.
#[derive(Debug, Serialize)]
pub struct CompatibilityView {
    pub user_a_id: String,
    pub user_b_id: String,
    pub overall_score: i64,
    pub overall_grade: &'static str,
    pub questionnaire: Option<SubScore>,
    pub attribute: Option<SubScore>,
    pub is_recommended: bool,
    pub calculated_at: Option<String>,
}

impl CompatibilityView {
    fn new(
        user_a_id: &str,
        user_b_id: &str,
        breakdown: ScoreBreakdown,
        calculated_at: Option<String>,
    ) -> CompatibilityView {
        CompatibilityView {
            user_a_id: user_a_id.to_string(),
            user_b_id: user_b_id.to_string(),
            overall_score: breakdown.overall_score,
            overall_grade: breakdown.overall_grade.as_str(),
            questionnaire: breakdown.questionnaire,
            attribute: breakdown.attribute,
            is_recommended: breakdown.is_recommended,
            calculated_at,
        }
    }
}

/// Single-pair entry point. Shares the exact cache/aggregator path the
/// ranker uses, so the two can never disagree.
pub async fn get_compatibility(
    pool: &SqlitePool,
    cache: &dyn ScoreCache,
    user_a_id: &str,
    user_b_id: &str,
) -> Result<CompatibilityView, MatchError> {
    let profile_a = load_required(pool, user_a_id).await?;
    let profile_b = load_required(pool, user_b_id).await?;

    let (first, second) = canonical_pair(user_a_id, user_b_id);
    let (breakdown, calculated_at) = ensure_scored(cache, &profile_a, &profile_b).await;
    Ok(CompatibilityView::new(first, second, breakdown, calculated_at))
}

async fn load_required(pool: &SqlitePool, user_id: &str) -> Result<UserProfileRow, MatchError> {
    profile_repo::load_profile(pool, user_id)
        .await?
        .ok_or_else(|| MatchError::NotFound(format!("user {}", user_id)))
}

/// Cache-or-compute for one pair. Cache trouble never fails the caller: a
/// failed read counts as a miss, a failed write skips memoization for this
/// round. Returns the breakdown plus the stored timestamp when the entry
/// came from (or landed in) the cache.
pub async fn ensure_scored(
    cache: &dyn ScoreCache,
    profile_a: &UserProfileRow,
    profile_b: &UserProfileRow,
) -> (ScoreBreakdown, Option<String>) {
    let (a, b) = (&profile_a.user_id, &profile_b.user_id);

    match cache.get(a, b).await {
        Ok(Some(CachedScore {
            breakdown,
            calculated_at,
            is_fresh: true,
        })) => return (breakdown, Some(calculated_at)),
        // Stale entries are recomputed: fresh data beats a cheap read.
        Ok(_) => {}
        Err(e) => {
            warn!(user_a = %a, user_b = %b, "compatibility cache read failed: {}", e);
        }
    }

    let breakdown = aggregator::score_pair(profile_a, profile_b);

    if let Err(e) = cache.put(a, b, &breakdown).await {
        warn!(user_a = %a, user_b = %b, "compatibility cache write failed: {}", e);
        return (breakdown, None);
    }

    // Re-read so repeated calls inside the freshness window return the
    // stored entry verbatim, timestamp included.
    match cache.get(a, b).await {
        Ok(Some(entry)) => (entry.breakdown, Some(entry.calculated_at)),
        _ => (breakdown, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use crate::services::cache::SqliteScoreCache;
    use crate::testutil::{insert_user, profile, test_pool};

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let pool = test_pool().await;
        let cache = SqliteScoreCache::new(pool.clone(), 7);
        insert_user(&pool, &profile("alice")).await;

        let err = get_compatibility(&pool, &cache, "alice", "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::NotFound(_)));
    }

    #[tokio::test]
    async fn doubly_empty_pair_gets_the_neutral_default() {
        let pool = test_pool().await;
        let cache = SqliteScoreCache::new(pool.clone(), 7);
        insert_user(&pool, &profile("alice")).await;
        insert_user(&pool, &profile("bob")).await;

        let view = get_compatibility(&pool, &cache, "alice", "bob")
            .await
            .unwrap();
        assert_eq!(view.overall_score, 50);
        assert_eq!(view.overall_grade, "C");
        assert!(!view.is_recommended);
        assert!(view.questionnaire.is_none());
        assert!(view.attribute.is_none());
    }

    #[tokio::test]
    async fn pair_order_does_not_matter() {
        let pool = test_pool().await;
        let cache = SqliteScoreCache::new(pool.clone(), 7);

        let mut alice = profile("alice");
        alice.questionnaire_json = Some("[5,4,3,2,1]".to_string());
        alice.natal_chart_json = Some(r#"{"sun":"leo","moon":"aries"}"#.to_string());
        let mut bob = profile("bob");
        bob.questionnaire_json = Some("[1,2,3,4,5]".to_string());
        bob.natal_chart_json = Some(r#"{"sun":"sagittarius","moon":"leo"}"#.to_string());
        insert_user(&pool, &alice).await;
        insert_user(&pool, &bob).await;

        let ab = get_compatibility(&pool, &cache, "alice", "bob")
            .await
            .unwrap();
        let ba = get_compatibility(&pool, &cache, "bob", "alice")
            .await
            .unwrap();
        assert_eq!(ab.overall_score, ba.overall_score);
        assert_eq!(ab.user_a_id, ba.user_a_id);
        assert_eq!(ab.user_b_id, ba.user_b_id);
        assert_eq!(ab.calculated_at, ba.calculated_at);
    }

    #[tokio::test]
    async fn fresh_cache_hits_skip_recomputation() {
        let pool = test_pool().await;
        let cache = SqliteScoreCache::new(pool.clone(), 7);

        let mut alice = profile("alice");
        alice.questionnaire_json = Some("[5,5,5,5,5]".to_string());
        let mut bob = profile("bob");
        bob.questionnaire_json = Some("[5,5,5,5,5]".to_string());
        insert_user(&pool, &alice).await;
        insert_user(&pool, &bob).await;

        let first = get_compatibility(&pool, &cache, "alice", "bob")
            .await
            .unwrap();
        assert_eq!(first.overall_score, 100);
        assert_eq!(first.overall_grade, "A");
        assert!(first.is_recommended);

        // If the second call recomputed, the edited answers would flip the
        // score to 0. The cached entry must win inside the window.
        sqlx::query("UPDATE users SET questionnaire_json = '[1,1,1,1,1]' WHERE user_id = 'bob'")
            .execute(&pool)
            .await
            .unwrap();

        let second = get_compatibility(&pool, &cache, "alice", "bob")
            .await
            .unwrap();
        assert_eq!(second.overall_score, 100);
        assert_eq!(second.calculated_at, first.calculated_at);
    }

    #[tokio::test]
    async fn stale_entries_are_recomputed() {
        let pool = test_pool().await;
        let cache = SqliteScoreCache::new(pool.clone(), 7);

        let mut alice = profile("alice");
        alice.questionnaire_json = Some("[5,5,5,5,5]".to_string());
        let mut bob = profile("bob");
        bob.questionnaire_json = Some("[5,5,5,5,5]".to_string());
        insert_user(&pool, &alice).await;
        insert_user(&pool, &bob).await;

        get_compatibility(&pool, &cache, "alice", "bob")
            .await
            .unwrap();

        sqlx::query("UPDATE users SET questionnaire_json = '[1,1,1,1,1]' WHERE user_id = 'bob'")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "UPDATE compatibility_scores SET calculated_at = datetime('now', '-8 days')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let recomputed = get_compatibility(&pool, &cache, "alice", "bob")
            .await
            .unwrap();
        assert_eq!(recomputed.overall_score, 0);
        assert_eq!(recomputed.overall_grade, "F");
    }

    #[tokio::test]
    async fn maximal_disagreement_scores_zero() {
        let pool = test_pool().await;
        let cache = SqliteScoreCache::new(pool.clone(), 7);

        let mut alice = profile("alice");
        alice.questionnaire_json = Some("[5,5,5,5,5]".to_string());
        let mut bob = profile("bob");
        bob.questionnaire_json = Some("[1,1,1,1,1]".to_string());
        insert_user(&pool, &alice).await;
        insert_user(&pool, &bob).await;

        let view = get_compatibility(&pool, &cache, "alice", "bob")
            .await
            .unwrap();
        assert_eq!(view.overall_score, 0);
        assert_eq!(view.overall_grade, "F");
        assert!(!view.is_recommended);
        assert_eq!(view.questionnaire.unwrap().grade, Grade::F);
        assert!(view.attribute.is_none());
    }
}
