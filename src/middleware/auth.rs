use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use quizzler_auth::{AuthError, TokenService};
use quizzler_core::AppError;

use crate::state::AppState;

/// Verifies the `Authorization` header of a request.
///
/// A header that is not valid visible ASCII cannot hold a bearer token and is
/// reported as malformed.
pub fn authorize_request(headers: &HeaderMap, tokens: &TokenService) -> Result<i64, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedCredential))
        .transpose()?;

    tokens.authorize(header)
}

/// The authenticated caller.
///
/// Reuses the identity established by [`require_auth`] when the route has it,
/// otherwise verifies the header itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let user_id = authorize_request(&parts.headers, &state.tokens)?;
        Ok(AuthUser(user_id))
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token, and
/// makes the caller available to handlers as [`AuthUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = authorize_request(request.headers(), &state.tokens)?;
    request.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(request).await)
}
