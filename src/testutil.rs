//! Shared helpers for the in-memory SQLite test pools.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{block_repo, schema, swipe_repo};
use crate::models::UserProfileRow;

pub async fn test_pool() -> SqlitePool {
    // A single connection keeps every query on the same :memory: database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    schema::ensure_schema(&pool).await.expect("schema bootstrap");
    pool
}

/// A fully eligible, fully discoverable profile with no scoring data and no
/// configured preferences. Tests override the fields they care about.
pub fn profile(user_id: &str) -> UserProfileRow {
    UserProfileRow {
        user_id: user_id.to_string(),
        name: Some(user_id.to_string()),
        age: Some(30),
        gender: None,
        city: None,
        main_photo_url: None,
        is_verified: Some(0),
        is_premium: Some(0),
        onboarding_completed: Some(1),
        latitude: None,
        longitude: None,
        zodiac_sign: None,
        questionnaire_json: None,
        natal_chart_json: None,
        last_active_at: None,
        gender_preference: None,
        min_age: None,
        max_age: None,
        max_distance_km: None,
        discovery_enabled: Some(1),
        incognito_mode: Some(0),
    }
}

pub async fn insert_user(pool: &SqlitePool, row: &UserProfileRow) {
    sqlx::query(
        r#"
INSERT INTO users (
  user_id, name, age, gender, city, main_photo_url,
  is_verified, is_premium, onboarding_completed,
  latitude, longitude, zodiac_sign,
  questionnaire_json, natal_chart_json, last_active_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(&row.user_id)
    .bind(&row.name)
    .bind(row.age)
    .bind(&row.gender)
    .bind(&row.city)
    .bind(&row.main_photo_url)
    .bind(row.is_verified.unwrap_or(0))
    .bind(row.is_premium.unwrap_or(0))
    .bind(row.onboarding_completed.unwrap_or(0))
    .bind(row.latitude)
    .bind(row.longitude)
    .bind(&row.zodiac_sign)
    .bind(&row.questionnaire_json)
    .bind(&row.natal_chart_json)
    .bind(&row.last_active_at)
    .execute(pool)
    .await
    .expect("insert user");

    sqlx::query(
        r#"
INSERT INTO user_preferences (
  user_id, gender_preference, min_age, max_age, max_distance_km,
  discovery_enabled, incognito_mode
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&row.user_id)
    .bind(&row.gender_preference)
    .bind(row.min_age)
    .bind(row.max_age)
    .bind(row.max_distance_km)
    .bind(row.discovery_enabled.unwrap_or(1))
    .bind(row.incognito_mode.unwrap_or(0))
    .execute(pool)
    .await
    .expect("insert user preferences");
}

pub async fn insert_swipe(pool: &SqlitePool, swiper_id: &str, swiped_id: &str, decision: &str) {
    let id = Uuid::new_v4().to_string();
    swipe_repo::insert_swipe(
        pool,
        swipe_repo::NewSwipe {
            id: &id,
            swiper_id,
            swiped_id,
            decision,
        },
    )
    .await
    .expect("insert swipe");
}

pub async fn insert_block(pool: &SqlitePool, blocker_id: &str, blocked_id: &str) {
    let id = Uuid::new_v4().to_string();
    block_repo::insert_block(
        pool,
        block_repo::NewBlock {
            id: &id,
            blocker_id,
            blocked_id,
        },
    )
    .await
    .expect("insert block");
}
