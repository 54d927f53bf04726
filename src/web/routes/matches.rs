use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::config;
use crate::error::MatchError;
use crate::models::MatchPage;
use crate::services::matching_service::{self, MatchQuery, SortMode};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct MatchesParams {
    pub zodiac: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_distance_km: Option<i64>,
    /// Comma-separated user ids to leave out of this page.
    pub exclude: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
}

pub async fn list_matches_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<MatchPage>, MatchError> {
    let query = MatchQuery {
        zodiac: params
            .zodiac
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty()),
        min_age: params.min_age,
        max_age: params.max_age,
        max_distance_km: params.max_distance_km,
        exclude_ids: parse_id_list(params.exclude.as_deref()),
        limit: params.limit.unwrap_or_else(config::default_page_size),
        offset: params.offset.unwrap_or(0),
        sort: SortMode::parse(params.sort.as_deref()),
    };

    matching_service::rank_candidates(&state.pool, state.cache.as_ref(), &auth_user.id, &query)
        .await
        .map(Json)
        .map_err(|e| {
            if matches!(e, MatchError::Store(_)) {
                warn!("match ranking failed for {}: {}", auth_user.id, e);
            }
            e
        })
}

fn parse_id_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
