use std::env;

use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;

use matching::config;
use matching::services::cache::{ScoreCache, SqliteScoreCache};

// Maintenance entry point: deployments run this on a timer to drop score
// entries that aged past the freshness window.
#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("cannot connect to database");

    let ttl_days = config::cache_ttl_days();
    let cache = SqliteScoreCache::new(pool, ttl_days);

    match cache.sweep_expired().await {
        Ok(removed) => {
            println!(
                "compatibility cache sweep: removed {} entries older than {} days",
                removed, ttl_days
            );
        }
        Err(e) => {
            eprintln!("compatibility cache sweep failed: {}", e);
            std::process::exit(1);
        }
    }
}
