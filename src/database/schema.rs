use sqlx::SqlitePool;

// Schema bootstrap. Table/index creation is idempotent; real deployments run
// the same DDL through their migration tooling, the service only needs the
// tables to exist.
const DDL: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS users (
  user_id              TEXT PRIMARY KEY,
  name                 TEXT,
  age                  INTEGER,
  gender               TEXT,
  city                 TEXT,
  main_photo_url       TEXT,
  is_verified          INTEGER NOT NULL DEFAULT 0,
  is_premium           INTEGER NOT NULL DEFAULT 0,
  onboarding_completed INTEGER NOT NULL DEFAULT 0,
  latitude             REAL,
  longitude            REAL,
  zodiac_sign          TEXT,
  questionnaire_json   TEXT,
  natal_chart_json     TEXT,
  last_active_at       TEXT,
  is_deleted           INTEGER NOT NULL DEFAULT 0
)
    "#,
    r#"
CREATE TABLE IF NOT EXISTS user_preferences (
  user_id           TEXT PRIMARY KEY,
  gender_preference TEXT,
  min_age           INTEGER,
  max_age           INTEGER,
  max_distance_km   INTEGER,
  discovery_enabled INTEGER NOT NULL DEFAULT 1,
  incognito_mode    INTEGER NOT NULL DEFAULT 0
)
    "#,
    r#"
CREATE TABLE IF NOT EXISTS swipes (
  id         TEXT PRIMARY KEY,
  swiper_id  TEXT NOT NULL,
  swiped_id  TEXT NOT NULL,
  decision   TEXT NOT NULL,
  created_at TEXT NOT NULL DEFAULT (datetime('now')),
  UNIQUE (swiper_id, swiped_id)
)
    "#,
    r#"
CREATE TABLE IF NOT EXISTS blocks (
  id         TEXT PRIMARY KEY,
  blocker_id TEXT NOT NULL,
  blocked_id TEXT NOT NULL,
  created_at TEXT NOT NULL DEFAULT (datetime('now')),
  UNIQUE (blocker_id, blocked_id)
)
    "#,
    r#"
CREATE TABLE IF NOT EXISTS compatibility_scores (
  user_a_id           TEXT NOT NULL,
  user_b_id           TEXT NOT NULL,
  overall_score       INTEGER NOT NULL,
  questionnaire_score INTEGER,
  attribute_score     INTEGER,
  overall_grade       TEXT NOT NULL,
  questionnaire_grade TEXT,
  attribute_grade     TEXT,
  is_recommended      INTEGER NOT NULL DEFAULT 0,
  calculated_at       TEXT NOT NULL DEFAULT (datetime('now')),
  PRIMARY KEY (user_a_id, user_b_id)
)
    "#,
    "CREATE INDEX IF NOT EXISTS idx_swipes_swiper ON swipes (swiper_id)",
    "CREATE INDEX IF NOT EXISTS idx_blocks_blocker ON blocks (blocker_id)",
    "CREATE INDEX IF NOT EXISTS idx_blocks_blocked ON blocks (blocked_id)",
    "CREATE INDEX IF NOT EXISTS idx_users_last_active ON users (last_active_at)",
];

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for statement in DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
