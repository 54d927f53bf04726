use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use matching::config;
use matching::database::schema;
use matching::services::cache::SqliteScoreCache;
use matching::web::middleware::auth as auth_middleware;
use matching::web::routes::{blocks, compatibility, health, matches, swipes};
use matching::web::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("cannot connect to database");
    schema::ensure_schema(&pool)
        .await
        .expect("cannot ensure schema");

    let state = AppState {
        pool: pool.clone(),
        cache: Arc::new(SqliteScoreCache::new(pool, config::cache_ttl_days())),
    };

    let protected_routes = Router::new()
        .route("/api/matches", get(matches::list_matches_handler))
        .route(
            "/api/compatibility/:user_id",
            get(compatibility::compatibility_handler),
        )
        .route("/api/swipes", post(swipes::swipe_command_handler))
        .route("/api/blocks", post(blocks::block_command_handler))
        .layer(middleware::from_fn(auth_middleware::require_auth));

    let app = Router::new()
        .route("/api/health", get(health::health_handler))
        .merge(protected_routes)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("cannot bind listener");
    tracing::info!("matching service listening on http://{}", addr);

    axum::serve(listener, app).await.unwrap();
}
