use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use quizzler_auth::TokenService;
use quizzler_cache::{Cache, CacheConfig, RedisStore};
use quizzler_config::{CorsConfig, DatabaseConfig, JwtConfig, RateLimitConfig};
use quizzler_db::{PgUserDirectory, UserDirectory, init_db_pool};

#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub cache: Cache,
    pub users: Arc<dyn UserDirectory>,
    pub rate_limit_config: RateLimitConfig,
    pub cors_config: CorsConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("cache", &self.cache)
            .field("rate_limit_config", &self.rate_limit_config)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

/// Builds the shared state from the environment.
///
/// A missing signing secret or database is fatal. An unreachable Redis is
/// not: the cache reconnects lazily and runs degraded until then.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env().context("Invalid JWT configuration")?;
    let tokens = TokenService::new(&jwt_config).context("Failed to build token service")?;

    let cache_config = CacheConfig::from_env();
    let store = RedisStore::new(&cache_config).context("Invalid Redis configuration")?;
    let cache = Cache::new(Arc::new(store), &cache_config);

    if cache.is_available().await {
        info!(redis.url = %cache_config.redis_url(), "Cache available");
    } else {
        warn!(
            redis.url = %cache_config.redis_url(),
            "Redis unreachable, running without cache and rate limits"
        );
    }

    let db_config = DatabaseConfig::from_env().context("Invalid database configuration")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;

    Ok(AppState {
        tokens,
        cache,
        users: Arc::new(PgUserDirectory::new(pool)),
        rate_limit_config: RateLimitConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    })
}
