use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::models::UserProfileRow;

const PROFILE_COLUMNS: &str = r#"
    u.user_id, u.name, u.age, u.gender, u.city, u.main_photo_url,
    u.is_verified, u.is_premium, u.onboarding_completed,
    u.latitude, u.longitude, u.zodiac_sign,
    u.questionnaire_json, u.natal_chart_json, u.last_active_at,
    p.gender_preference, p.min_age, p.max_age, p.max_distance_km,
    p.discovery_enabled, p.incognito_mode
"#;

pub const SQL_LOAD_PROFILE: &str = r#"
SELECT
    u.user_id, u.name, u.age, u.gender, u.city, u.main_photo_url,
    u.is_verified, u.is_premium, u.onboarding_completed,
    u.latitude, u.longitude, u.zodiac_sign,
    u.questionnaire_json, u.natal_chart_json, u.last_active_at,
    p.gender_preference, p.min_age, p.max_age, p.max_distance_km,
    p.discovery_enabled, p.incognito_mode
FROM users u
LEFT JOIN user_preferences p ON p.user_id = u.user_id
WHERE u.user_id = ?1
    AND (u.is_deleted = 0 OR u.is_deleted IS NULL)
"#;

pub async fn load_profile(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Option<UserProfileRow>> {
    sqlx::query_as::<_, UserProfileRow>(SQL_LOAD_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Cheap DB-level filters for the candidate superset. The eligibility filter
/// re-checks everything in process; this query only keeps the pool small.
#[derive(Debug, Default)]
pub struct CandidatePoolSpec {
    pub zodiac: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub exclude_ids: Vec<String>,
    /// (min_lat, max_lat, min_lon, max_lon) prefilter when the viewer has a
    /// location and a distance cap. Candidates without coordinates are kept:
    /// missing geodata never excludes.
    pub bbox: Option<(f64, f64, f64, f64)>,
    pub limit: i64,
}

pub async fn load_candidate_pool(
    pool: &SqlitePool,
    viewer_id: &str,
    spec: &CandidatePoolSpec,
) -> sqlx::Result<Vec<UserProfileRow>> {
    let mut sql = format!(
        r#"
SELECT {PROFILE_COLUMNS}
FROM users u
LEFT JOIN user_preferences p ON p.user_id = u.user_id
WHERE (u.is_deleted = 0 OR u.is_deleted IS NULL)
    AND u.user_id != ?
    AND u.onboarding_completed = 1
    AND COALESCE(p.discovery_enabled, 1) = 1
    AND COALESCE(p.incognito_mode, 0) = 0
    AND NOT EXISTS (
        SELECT 1 FROM swipes s
        WHERE s.swiper_id = ? AND s.swiped_id = u.user_id
    )
    AND NOT EXISTS (
        SELECT 1 FROM blocks b
        WHERE (b.blocker_id = ? AND b.blocked_id = u.user_id)
           OR (b.blocker_id = u.user_id AND b.blocked_id = ?)
    )
"#
    );
    let mut args = SqliteArguments::default();
    args.add(viewer_id);
    args.add(viewer_id);
    args.add(viewer_id);
    args.add(viewer_id);

    if let Some(zodiac) = spec.zodiac.as_deref() {
        sql.push_str(" AND LOWER(u.zodiac_sign) = LOWER(?)");
        args.add(zodiac);
    }
    if let Some(min_age) = spec.min_age {
        sql.push_str(" AND u.age >= ?");
        args.add(min_age);
    }
    if let Some(max_age) = spec.max_age {
        sql.push_str(" AND u.age <= ?");
        args.add(max_age);
    }
    if let Some((min_lat, max_lat, min_lon, max_lon)) = spec.bbox {
        sql.push_str(
            " AND (u.latitude IS NULL OR u.longitude IS NULL \
             OR (u.latitude BETWEEN ? AND ? AND u.longitude BETWEEN ? AND ?))",
        );
        args.add(min_lat);
        args.add(max_lat);
        args.add(min_lon);
        args.add(max_lon);
    }
    if !spec.exclude_ids.is_empty() {
        sql.push_str(" AND u.user_id NOT IN (");
        for (i, id) in spec.exclude_ids.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            args.add(id);
        }
        sql.push(')');
    }

    sql.push_str(" ORDER BY u.last_active_at DESC LIMIT ?");
    args.add(spec.limit);

    sqlx::query_as_with::<_, UserProfileRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}
