//! # Quizzler Auth
//!
//! Stateless identity tokens for the Quizzler API.
//!
//! - [`claims`]: the token payload
//! - [`jwt`]: [`TokenService`], which issues and verifies tokens
//! - [`error`]: [`AuthError`] (per request) and [`TokenError`] (startup/signing)
//!
//! Tokens are HS256 JWTs carrying the numeric user id. Nothing is persisted
//! server-side; a token is valid as long as its signature checks out and, when
//! an expiry is configured, it has not expired.
//!
//! # Example
//!
//! ```ignore
//! use quizzler_auth::TokenService;
//! use quizzler_config::JwtConfig;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env()?)?;
//!
//! let token = tokens.issue(42)?;
//! let user_id = tokens.authorize(Some(&format!("Bearer {token}")))?;
//! assert_eq!(user_id, 42);
//! ```

pub mod claims;
pub mod error;
pub mod jwt;

pub use claims::Claims;
pub use error::{AuthError, TokenError};
pub use jwt::{TokenService, bearer_token};
