// One row per user, joined with user_preferences (preference columns are
// COALESCE-d to their broad defaults in SQL where filtering depends on them).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProfileRow {
    pub user_id: String,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub main_photo_url: Option<String>,
    pub is_verified: Option<i64>,
    pub is_premium: Option<i64>,
    pub onboarding_completed: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zodiac_sign: Option<String>,
    pub questionnaire_json: Option<String>,
    pub natal_chart_json: Option<String>,
    pub last_active_at: Option<String>,
    pub gender_preference: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_distance_km: Option<i64>,
    pub discovery_enabled: Option<i64>,
    pub incognito_mode: Option<i64>,
}

impl UserProfileRow {
    pub fn is_onboarded(&self) -> bool {
        self.onboarding_completed.unwrap_or(0) == 1
    }

    pub fn is_discoverable(&self) -> bool {
        self.discovery_enabled.unwrap_or(1) == 1
    }

    pub fn is_incognito(&self) -> bool {
        self.incognito_mode.unwrap_or(0) == 1
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
