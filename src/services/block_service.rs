use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{block_repo, profile_repo};
use crate::error::MatchError;
use crate::services::cache::ScoreCache;

/// Record a block and drop the pair's cached score: a blocked pair must not
/// keep a live compatibility entry around.
pub async fn record_block(
    pool: &SqlitePool,
    cache: &dyn ScoreCache,
    actor_user_id: &str,
    target_user_id: &str,
) -> Result<bool, MatchError> {
    if actor_user_id == target_user_id {
        return Err(MatchError::InvalidArgument(
            "cannot block yourself".to_string(),
        ));
    }
    if profile_repo::load_profile(pool, target_user_id)
        .await?
        .is_none()
    {
        return Err(MatchError::NotFound(format!("user {}", target_user_id)));
    }

    let id = Uuid::new_v4().to_string();
    let inserted = block_repo::insert_block(
        pool,
        block_repo::NewBlock {
            id: &id,
            blocker_id: actor_user_id,
            blocked_id: target_user_id,
        },
    )
    .await?;

    cache.invalidate(actor_user_id, target_user_id).await?;
    Ok(inserted)
}
