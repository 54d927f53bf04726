use sqlx::SqlitePool;

use crate::models::{CompatibilityScoreRow, ScoreBreakdown};

// All functions here expect the pair key already canonicalized (smaller id
// first); `services::cache` owns that invariant.

const SQL_GET_SCORE: &str = r#"
SELECT
  user_a_id,
  user_b_id,
  overall_score,
  questionnaire_score,
  attribute_score,
  overall_grade,
  questionnaire_grade,
  attribute_grade,
  is_recommended,
  calculated_at,
  CASE WHEN calculated_at >= datetime('now', ?3) THEN 1 ELSE 0 END AS is_fresh
FROM compatibility_scores
WHERE user_a_id = ?1 AND user_b_id = ?2
"#;

const SQL_UPSERT_SCORE: &str = r#"
INSERT INTO compatibility_scores (
  user_a_id,
  user_b_id,
  overall_score,
  questionnaire_score,
  attribute_score,
  overall_grade,
  questionnaire_grade,
  attribute_grade,
  is_recommended,
  calculated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
ON CONFLICT (user_a_id, user_b_id) DO UPDATE SET
  overall_score = excluded.overall_score,
  questionnaire_score = excluded.questionnaire_score,
  attribute_score = excluded.attribute_score,
  overall_grade = excluded.overall_grade,
  questionnaire_grade = excluded.questionnaire_grade,
  attribute_grade = excluded.attribute_grade,
  is_recommended = excluded.is_recommended,
  calculated_at = datetime('now')
"#;

const SQL_DELETE_PAIR: &str = r#"
DELETE FROM compatibility_scores WHERE user_a_id = ?1 AND user_b_id = ?2
"#;

const SQL_DELETE_USER: &str = r#"
DELETE FROM compatibility_scores WHERE user_a_id = ?1 OR user_b_id = ?1
"#;

const SQL_SWEEP_EXPIRED: &str = r#"
DELETE FROM compatibility_scores WHERE calculated_at < datetime('now', ?1)
"#;

fn ttl_modifier(ttl_days: i64) -> String {
    format!("-{} days", ttl_days.max(0))
}

pub async fn get_score(
    pool: &SqlitePool,
    user_a: &str,
    user_b: &str,
    ttl_days: i64,
) -> sqlx::Result<Option<CompatibilityScoreRow>> {
    sqlx::query_as::<_, CompatibilityScoreRow>(SQL_GET_SCORE)
        .bind(user_a)
        .bind(user_b)
        .bind(ttl_modifier(ttl_days))
        .fetch_optional(pool)
        .await
}

/// Upsert. Last write wins; concurrent writers for the same pair produce the
/// same values anyway since the calculators are deterministic.
pub async fn upsert_score(
    pool: &SqlitePool,
    user_a: &str,
    user_b: &str,
    breakdown: &ScoreBreakdown,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_SCORE)
        .bind(user_a)
        .bind(user_b)
        .bind(breakdown.overall_score)
        .bind(breakdown.questionnaire.map(|s| s.score))
        .bind(breakdown.attribute.map(|s| s.score))
        .bind(breakdown.overall_grade.as_str())
        .bind(breakdown.questionnaire.map(|s| s.grade.as_str()))
        .bind(breakdown.attribute.map(|s| s.grade.as_str()))
        .bind(breakdown.is_recommended as i64)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_pair(pool: &SqlitePool, user_a: &str, user_b: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_DELETE_PAIR)
        .bind(user_a)
        .bind(user_b)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_user_pairs(pool: &SqlitePool, user_id: &str) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_DELETE_USER)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn sweep_expired(pool: &SqlitePool, ttl_days: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_SWEEP_EXPIRED)
        .bind(ttl_modifier(ttl_days))
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
