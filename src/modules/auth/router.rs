use axum::{
    Router, middleware,
    routing::{get, post},
};

use quizzler_cache::RateLimiter;

use crate::middleware::auth::require_auth;
use crate::middleware::rate_limit::rate_limit;
use crate::state::AppState;

use super::controller::{get_profile, login_user, register_user};

/// Registration and login carry the strict auth limit. The profile route is
/// authenticated and carries the general limit, checked before the token so
/// that rejected credentials still count.
pub fn init_auth_router(state: &AppState) -> Router<AppState> {
    let limits = &state.rate_limit_config;
    let auth_limiter =
        RateLimiter::new(state.cache.clone(), limits.auth_max_requests, limits.window);
    let general_limiter =
        RateLimiter::new(state.cache.clone(), limits.general_max_requests, limits.window);

    let public = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route_layer(middleware::from_fn_with_state(auth_limiter, rate_limit));

    let protected = Router::new()
        .route("/me", get(get_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .route_layer(middleware::from_fn_with_state(general_limiter, rate_limit));

    public.merge(protected)
}
