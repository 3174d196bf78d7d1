use quizzler_core::AppError;

/// Why a request's credential was rejected.
///
/// Always terminal for the request and never retried; every variant renders
/// as `401 Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Bearer token required")]
    MalformedCredential,

    #[error("Invalid token")]
    InvalidSignatureOrClaims,
}

/// Failure to build a [`TokenService`](crate::TokenService) or sign a token.
///
/// These indicate a misconfigured signing key and are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::unauthorized(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::internal(err)
    }
}
