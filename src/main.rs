//! InFarm - a community platform for small farms: articles, a discussion
//! forum, a marketplace, and role-based administration.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use infarm::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxArticleRepository, SqlxForumRepository, SqlxProductRepository,
            SqlxSessionRepository, SqlxUserRepository,
        },
    },
    services::UserService,
};

/// How often the expired-session reaper runs
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infarm=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting InFarm...");

    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let user_service = Arc::new(UserService::new(user_repo.clone(), session_repo));

    // Periodic cleanup of expired sessions
    {
        let service = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                SESSION_CLEANUP_INTERVAL_SECS,
            ));
            loop {
                interval.tick().await;
                match service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} expired sessions", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    let state = AppState {
        pool: pool.clone(),
        user_service,
        user_repo,
        article_repo: SqlxArticleRepository::boxed(pool.clone()),
        product_repo: SqlxProductRepository::boxed(pool.clone()),
        forum_repo: SqlxForumRepository::boxed(pool),
    };

    let app = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
