use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::cache::ScoreCache;

pub mod middleware;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub cache: Arc<dyn ScoreCache>,
}
