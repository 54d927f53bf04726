use std::collections::HashSet;

use sqlx::{Row, SqlitePool};

pub struct NewSwipe<'a> {
    pub id: &'a str,
    pub swiper_id: &'a str,
    pub swiped_id: &'a str,
    pub decision: &'a str, // like|pass
}

// Append-only, unique per ordered pair. Replays are no-ops so a double-tap
// on the client never errors.
const SQL_INSERT_SWIPE: &str = r#"
INSERT INTO swipes (id, swiper_id, swiped_id, decision)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (swiper_id, swiped_id) DO NOTHING
"#;

const SQL_HAS_SWIPED: &str = r#"
SELECT 1 FROM swipes WHERE swiper_id = ?1 AND swiped_id = ?2 LIMIT 1
"#;

const SQL_LIST_SWIPED_IDS: &str = r#"
SELECT swiped_id FROM swipes WHERE swiper_id = ?1
"#;

pub async fn insert_swipe(pool: &SqlitePool, swipe: NewSwipe<'_>) -> sqlx::Result<bool> {
    let result = sqlx::query(SQL_INSERT_SWIPE)
        .bind(swipe.id)
        .bind(swipe.swiper_id)
        .bind(swipe.swiped_id)
        .bind(swipe.decision)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn has_swiped(pool: &SqlitePool, swiper_id: &str, swiped_id: &str) -> sqlx::Result<bool> {
    let row = sqlx::query(SQL_HAS_SWIPED)
        .bind(swiper_id)
        .bind(swiped_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// All ids the viewer already evaluated, fetched once per ranking request.
pub async fn list_swiped_ids(pool: &SqlitePool, swiper_id: &str) -> sqlx::Result<HashSet<String>> {
    let rows = sqlx::query(SQL_LIST_SWIPED_IDS)
        .bind(swiper_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|row| row.get("swiped_id")).collect())
}
