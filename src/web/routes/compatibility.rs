use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::warn;

use crate::error::MatchError;
use crate::services::compatibility_service::{self, CompatibilityView};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

/// Detailed "why did we match" breakdown for the viewer and one other user.
pub async fn compatibility_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CompatibilityView>, MatchError> {
    compatibility_service::get_compatibility(
        &state.pool,
        state.cache.as_ref(),
        &auth_user.id,
        &user_id,
    )
    .await
    .map(Json)
    .map_err(|e| {
        if matches!(e, MatchError::Store(_)) {
            warn!(
                "compatibility lookup failed for ({}, {}): {}",
                auth_user.id, user_id, e
            );
        }
        e
    })
}
