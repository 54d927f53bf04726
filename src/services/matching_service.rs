use std::cmp::Ordering;

use futures::stream::{self, StreamExt};
use sqlx::SqlitePool;
use tracing::debug;

use crate::config;
use crate::database::{block_repo, profile_repo, swipe_repo};
use crate::error::MatchError;
use crate::models::{MatchCandidateResult, MatchPage, ScoreBreakdown, UserProfileRow};
use crate::services::cache::ScoreCache;
use crate::services::{compatibility_service, eligibility, geo};

/// Ranked-output ordering. The source product has shipped both of these at
/// different times, so the caller picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Premium profiles first, then nearest, then most recently active.
    /// Compatibility is exposed on each row but does not drive the order.
    #[default]
    PriorityDistanceRecency,
    /// Highest compatibility first; the baseline ordering breaks ties.
    CompatibilityDesc,
}

impl SortMode {
    pub fn parse(input: Option<&str>) -> SortMode {
        match input.unwrap_or("").trim() {
            "compatibility_desc" | "compatibility" => SortMode::CompatibilityDesc,
            _ => SortMode::PriorityDistanceRecency,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::PriorityDistanceRecency => "priority_distance_recency",
            SortMode::CompatibilityDesc => "compatibility_desc",
        }
    }
}

/// All optional knobs for one ranking request, with named defaults, so the
/// entry point stays a single function.
#[derive(Debug)]
pub struct MatchQuery {
    pub zodiac: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_distance_km: Option<i64>,
    pub exclude_ids: Vec<String>,
    pub limit: i64,
    pub offset: i64,
    pub sort: SortMode,
}

impl Default for MatchQuery {
    fn default() -> MatchQuery {
        MatchQuery {
            zodiac: None,
            min_age: None,
            max_age: None,
            max_distance_km: None,
            exclude_ids: Vec::new(),
            limit: config::default_page_size(),
            offset: 0,
            sort: SortMode::default(),
        }
    }
}

/// The ranking entry point: candidate pool -> eligibility -> cache-or-compute
/// scoring -> sort -> page.
pub async fn rank_candidates(
    pool: &SqlitePool,
    cache: &dyn ScoreCache,
    viewer_id: &str,
    query: &MatchQuery,
) -> Result<MatchPage, MatchError> {
    if query.limit < 1 {
        return Err(MatchError::InvalidArgument(
            "limit must be at least 1".to_string(),
        ));
    }
    if query.limit > config::MAX_PAGE_SIZE {
        return Err(MatchError::InvalidArgument(format!(
            "limit must be at most {}",
            config::MAX_PAGE_SIZE
        )));
    }
    if query.offset < 0 {
        return Err(MatchError::InvalidArgument(
            "offset must not be negative".to_string(),
        ));
    }

    let viewer = profile_repo::load_profile(pool, viewer_id)
        .await?
        .filter(UserProfileRow::is_onboarded)
        .ok_or_else(|| MatchError::NotFound(format!("viewer {}", viewer_id)))?;

    // One consistent read of the exclusion state for the whole request.
    let swiped_ids = swipe_repo::list_swiped_ids(pool, viewer_id).await?;
    let blocked_ids = block_repo::list_blocked_ids(pool, viewer_id).await?;

    let max_distance_km = query.max_distance_km.or(viewer.max_distance_km);
    let bbox = viewer
        .location()
        .zip(max_distance_km)
        .map(|((lat, lon), radius)| geo::bounding_box(lat, lon, radius as f64));

    let spec = profile_repo::CandidatePoolSpec {
        zodiac: query.zodiac.clone(),
        min_age: query.min_age,
        max_age: query.max_age,
        exclude_ids: query.exclude_ids.clone(),
        bbox,
        limit: (query.offset + query.limit) * config::POOL_OVERFETCH_FACTOR,
    };
    let pool_rows = profile_repo::load_candidate_pool(pool, viewer_id, &spec).await?;

    let mut eligible = Vec::with_capacity(pool_rows.len());
    for candidate in pool_rows {
        let violations = eligibility::check(
            &viewer,
            &candidate,
            &swiped_ids,
            &blocked_ids,
            query.max_distance_km,
        );
        if violations.is_empty() {
            eligible.push(candidate);
            continue;
        }
        let reasons: Vec<&str> = violations.iter().map(|v| v.as_str()).collect();
        debug!(
            viewer = %viewer_id,
            candidate = %candidate.user_id,
            ?reasons,
            "candidate dropped by eligibility filter"
        );
    }

    // Scoring is pure CPU plus cache I/O and independent per candidate, so
    // fan out with a bounded worker pool.
    let viewer_ref = &viewer;
    let mut results: Vec<MatchCandidateResult> = stream::iter(eligible)
        .map(|candidate| async move {
            let (breakdown, _) =
                compatibility_service::ensure_scored(cache, viewer_ref, &candidate).await;
            build_result(viewer_ref, candidate, breakdown)
        })
        .buffer_unordered(config::SCORING_CONCURRENCY)
        .collect()
        .await;

    match query.sort {
        SortMode::PriorityDistanceRecency => results.sort_by(baseline_order),
        SortMode::CompatibilityDesc => results.sort_by(|a, b| {
            b.compatibility_score
                .cmp(&a.compatibility_score)
                .then_with(|| baseline_order(a, b))
        }),
    }

    let results = results
        .into_iter()
        .skip(query.offset as usize)
        .take(query.limit as usize)
        .collect();

    Ok(MatchPage {
        results,
        limit: query.limit,
        offset: query.offset,
    })
}

fn build_result(
    viewer: &UserProfileRow,
    candidate: UserProfileRow,
    breakdown: ScoreBreakdown,
) -> MatchCandidateResult {
    let distance_km = viewer
        .location()
        .zip(candidate.location())
        .map(|((vlat, vlon), (clat, clon))| geo::haversine_km(vlat, vlon, clat, clon));

    MatchCandidateResult {
        user_id: candidate.user_id,
        name: candidate.name,
        age: candidate.age,
        gender: candidate.gender,
        city: candidate.city,
        main_photo_url: candidate.main_photo_url,
        is_verified: candidate.is_verified.unwrap_or(0) == 1,
        is_premium: candidate.is_premium.unwrap_or(0) == 1,
        zodiac_sign: candidate.zodiac_sign,
        last_active_at: candidate.last_active_at,
        distance_km,
        compatibility_score: breakdown.overall_score,
        compatibility_grade: breakdown.overall_grade,
        is_recommended: breakdown.is_recommended,
    }
}

// Premium desc, distance asc with unknowns last, then most recently active.
fn baseline_order(a: &MatchCandidateResult, b: &MatchCandidateResult) -> Ordering {
    b.is_premium
        .cmp(&a.is_premium)
        .then_with(|| {
            a.distance_km
                .unwrap_or(f64::MAX)
                .partial_cmp(&b.distance_km.unwrap_or(f64::MAX))
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.last_active_at.cmp(&a.last_active_at))
}
