//! Token issuance and verification.
//!
//! [`TokenService`] is built once at startup from [`JwtConfig`] and shared
//! read-only by every request. It owns no mutable state.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use quizzler_config::JwtConfig;

use crate::claims::Claims;
use crate::error::{AuthError, TokenError};

const BEARER_PREFIX: &str = "Bearer ";

/// Issues and verifies HS256 identity tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Option<Duration>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates the service from the process-wide signing configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptySecret`] if the secret is blank. Callers
    /// should treat this as fatal and refuse to serve traffic.
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        if config.secret.trim().is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        if config.token_expiry.is_some() {
            validation.required_spec_claims.insert("exp".to_string());
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expiry: config.token_expiry,
        })
    }

    /// Signs a token for `user_id`.
    ///
    /// # Errors
    ///
    /// Only fails if the signing key is unusable.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp() as usize;
        // Absurd lifetimes clamp to the far future instead of wrapping.
        let exp = self.expiry.map(|expiry| {
            let secs = usize::try_from(expiry.as_secs()).unwrap_or(usize::MAX);
            now.saturating_add(secs)
        });
        let claims = Claims {
            user_id,
            iat: Some(now),
            exp,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verifies a raw token and returns the user id it was issued for.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidSignatureOrClaims`] if the signature does not
    /// match, the token has expired, or `user_id` is missing or not an integer.
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|_| AuthError::InvalidSignatureOrClaims)
    }

    /// Checks an `Authorization` header value end to end.
    pub fn authorize(&self, header: Option<&str>) -> Result<i64, AuthError> {
        self.verify(bearer_token(header)?)
    }
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-sensitively, as issued by the login endpoints.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    if header.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::MalformedCredential)?;

    if token.is_empty() {
        return Err(AuthError::MalformedCredential);
    }

    Ok(token)
}
