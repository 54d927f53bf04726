use serde::Serialize;

use crate::models::compatibility::Grade;

/// Per-candidate row returned by the ranker. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidateResult {
    pub user_id: String,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub main_photo_url: Option<String>,
    pub is_verified: bool,
    pub is_premium: bool,
    pub zodiac_sign: Option<String>,
    pub last_active_at: Option<String>,
    pub distance_km: Option<f64>,
    pub compatibility_score: i64,
    pub compatibility_grade: Grade,
    pub is_recommended: bool,
}

#[derive(Debug, Serialize)]
pub struct MatchPage {
    pub results: Vec<MatchCandidateResult>,
    pub limit: i64,
    pub offset: i64,
}
