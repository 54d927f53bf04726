use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::MatchError;
use crate::services::block_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockBody {
    pub target_user_id: String,
}

pub async fn block_command_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<BlockBody>,
) -> Result<Json<Value>, MatchError> {
    let recorded = block_service::record_block(
        &state.pool,
        state.cache.as_ref(),
        &auth_user.id,
        &body.target_user_id,
    )
    .await
    .map_err(|e| {
        if matches!(e, MatchError::Store(_)) {
            warn!("block command failed for {}: {}", auth_user.id, e);
        }
        e
    })?;

    Ok(Json(json!({ "recorded": recorded })))
}
