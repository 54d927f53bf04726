use std::collections::HashSet;

use sqlx::{Row, SqlitePool};

pub struct NewBlock<'a> {
    pub id: &'a str,
    pub blocker_id: &'a str,
    pub blocked_id: &'a str,
}

const SQL_INSERT_BLOCK: &str = r#"
INSERT INTO blocks (id, blocker_id, blocked_id)
VALUES (?1, ?2, ?3)
ON CONFLICT (blocker_id, blocked_id) DO NOTHING
"#;

// A block hides both users from each other, so every lookup checks the edge
// in both directions.
const SQL_IS_BLOCKED: &str = r#"
SELECT 1 FROM blocks
WHERE (blocker_id = ?1 AND blocked_id = ?2)
   OR (blocker_id = ?2 AND blocked_id = ?1)
LIMIT 1
"#;

const SQL_LIST_BLOCKED_IDS: &str = r#"
SELECT blocked_id AS other_id FROM blocks WHERE blocker_id = ?1
UNION
SELECT blocker_id AS other_id FROM blocks WHERE blocked_id = ?1
"#;

pub async fn insert_block(pool: &SqlitePool, block: NewBlock<'_>) -> sqlx::Result<bool> {
    let result = sqlx::query(SQL_INSERT_BLOCK)
        .bind(block.id)
        .bind(block.blocker_id)
        .bind(block.blocked_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_blocked(pool: &SqlitePool, user_a: &str, user_b: &str) -> sqlx::Result<bool> {
    let row = sqlx::query(SQL_IS_BLOCKED)
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Every id blocked by or blocking the user, fetched once per ranking request.
pub async fn list_blocked_ids(pool: &SqlitePool, user_id: &str) -> sqlx::Result<HashSet<String>> {
    let rows = sqlx::query(SQL_LIST_BLOCKED_IDS)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|row| row.get("other_id")).collect())
}
