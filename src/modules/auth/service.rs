use tracing::{info, instrument, warn};

use quizzler_auth::TokenService;
use quizzler_cache::{Cache, keys};
use quizzler_core::AppError;
use quizzler_db::{User, UserDirectory};

use super::model::{AuthResponse, LoginRequest, RegisterRequest};

pub struct AuthService;

impl AuthService {
    /// Creates the account, caches the new user and signs a token for it.
    #[instrument(skip_all, fields(user.email = %dto.email))]
    pub async fn register(
        users: &dyn UserDirectory,
        tokens: &TokenService,
        cache: &Cache,
        dto: RegisterRequest,
    ) -> Result<AuthResponse, AppError> {
        let email = dto.email.to_lowercase();
        let user = users.create(&email, &dto.password).await?;

        if let Err(e) = cache.set(&keys::user(user.id), &user).await {
            warn!(error = %e, user.id = %user.id, "Failed to cache new user");
        }

        let token = tokens.issue(user.id)?;
        info!(user.id = %user.id, "User registered");

        Ok(AuthResponse { token, user })
    }

    #[instrument(skip_all, fields(user.email = %dto.email))]
    pub async fn login(
        users: &dyn UserDirectory,
        tokens: &TokenService,
        dto: LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        let email = dto.email.to_lowercase();
        let user = users
            .authenticate(&email, &dto.password)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        let token = tokens.issue(user.id)?;

        Ok(AuthResponse { token, user })
    }

    /// The caller's account, read through the cache.
    #[instrument(skip(users, cache))]
    pub async fn profile(
        users: &dyn UserDirectory,
        cache: &Cache,
        user_id: i64,
    ) -> Result<User, AppError> {
        cache
            .get_or_load(&keys::user(user_id), cache.default_ttl(), || async {
                users
                    .find_by_id(user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("User not found"))
            })
            .await
    }
}
