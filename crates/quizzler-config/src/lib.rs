//! # Quizzler Config
//!
//! Configuration types for the Quizzler API, loaded from environment variables.
//!
//! - [`jwt`]: token signing configuration (the secret is mandatory)
//! - [`rate_limit`]: fixed-window rate limiting ceilings
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`server`]: listener address
//! - [`database`]: relational store connection settings
//!
//! Variables are read from the process environment. Binaries are expected to
//! call `dotenvy::dotenv()` before loading anything.
//!
//! # Example
//!
//! ```ignore
//! use quizzler_config::{JwtConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env()?;
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod error;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
