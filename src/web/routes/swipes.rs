use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::MatchError;
use crate::services::swipe_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeBody {
    pub target_user_id: String,
    pub decision: String, // like|pass
}

pub async fn swipe_command_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<SwipeBody>,
) -> Result<Json<Value>, MatchError> {
    let recorded = swipe_service::record_swipe(
        &state.pool,
        &auth_user.id,
        &body.target_user_id,
        &body.decision,
    )
    .await
    .map_err(|e| {
        if matches!(e, MatchError::Store(_)) {
            warn!("swipe command failed for {}: {}", auth_user.id, e);
        }
        e
    })?;

    Ok(Json(json!({ "recorded": recorded })))
}
