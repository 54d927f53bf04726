use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{profile_repo, swipe_repo};
use crate::error::MatchError;

/// Record a swipe decision. Returns false when the pair was already swiped
/// (replays are idempotent no-ops).
pub async fn record_swipe(
    pool: &SqlitePool,
    actor_user_id: &str,
    target_user_id: &str,
    decision: &str,
) -> Result<bool, MatchError> {
    let decision = decision.trim();
    if decision != "like" && decision != "pass" {
        return Err(MatchError::InvalidArgument(
            "decision must be like or pass".to_string(),
        ));
    }
    if actor_user_id == target_user_id {
        return Err(MatchError::InvalidArgument(
            "cannot swipe on yourself".to_string(),
        ));
    }
    if profile_repo::load_profile(pool, target_user_id)
        .await?
        .is_none()
    {
        return Err(MatchError::NotFound(format!("user {}", target_user_id)));
    }

    let id = Uuid::new_v4().to_string();
    let inserted = swipe_repo::insert_swipe(
        pool,
        swipe_repo::NewSwipe {
            id: &id,
            swiper_id: actor_user_id,
            swiped_id: target_user_id,
            decision,
        },
    )
    .await?;
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{insert_user, profile, test_pool};

    #[tokio::test]
    async fn records_and_deduplicates_swipes() {
        let pool = test_pool().await;
        insert_user(&pool, &profile("alice")).await;
        insert_user(&pool, &profile("bob")).await;

        assert!(record_swipe(&pool, "alice", "bob", "like").await.unwrap());
        // Second evaluation of the same ordered pair is a no-op.
        assert!(!record_swipe(&pool, "alice", "bob", "pass").await.unwrap());
        // The reverse direction is its own record.
        assert!(record_swipe(&pool, "bob", "alice", "pass").await.unwrap());

        assert!(crate::database::swipe_repo::has_swiped(&pool, "alice", "bob")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn rejects_bad_input() {
        let pool = test_pool().await;
        insert_user(&pool, &profile("alice")).await;
        insert_user(&pool, &profile("bob")).await;

        assert!(matches!(
            record_swipe(&pool, "alice", "bob", "superlike").await,
            Err(MatchError::InvalidArgument(_))
        ));
        assert!(matches!(
            record_swipe(&pool, "alice", "alice", "like").await,
            Err(MatchError::InvalidArgument(_))
        ));
        assert!(matches!(
            record_swipe(&pool, "alice", "ghost", "like").await,
            Err(MatchError::NotFound(_))
        ));
    }
}
