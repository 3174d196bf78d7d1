use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use quizzler_core::AppError;
use quizzler_db::User;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{AuthResponse, LoginRequest, RegisterRequest};
use super::service::AuthService;

/// Register a new user
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response =
        AuthService::register(state.users.as_ref(), &state.tokens, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login and receive a bearer token
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = AuthService::login(state.users.as_ref(), &state.tokens, dto).await?;
    Ok(Json(response))
}

/// The authenticated caller's account
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user =
        AuthService::profile(state.users.as_ref(), &state.cache, auth_user.user_id()).await?;
    Ok(Json(user))
}
