use std::env;

/// Overall score at or above which a pair is flagged as recommended.
pub const RECOMMENDATION_THRESHOLD: i64 = 70;

// Effective bounds for viewers that never configured age preferences:
// an unconfigured viewer sees a maximally broad pool.
pub const DEFAULT_MIN_AGE: i64 = 18;
pub const DEFAULT_MAX_AGE: i64 = 100;

pub const DEFAULT_PAGE_SIZE: i64 = 25;
pub const MAX_PAGE_SIZE: i64 = 100;

/// The candidate pool query over-fetches by this factor to compensate for
/// post-filter attrition.
pub const POOL_OVERFETCH_FACTOR: i64 = 2;

/// Bounded worker cap for scoring candidates within one ranking request.
pub const SCORING_CONCURRENCY: usize = 8;

pub const DEFAULT_CACHE_TTL_DAYS: i64 = 7;

pub fn cache_ttl_days() -> i64 {
    env::var("COMPAT_CACHE_TTL_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_CACHE_TTL_DAYS)
}

pub fn default_page_size() -> i64 {
    env::var("MATCH_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|n| *n >= 1 && *n <= MAX_PAGE_SIZE)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}
