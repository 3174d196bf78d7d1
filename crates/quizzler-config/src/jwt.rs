//! Token signing configuration.
//!
//! The signing secret is process-wide and mandatory: a process without
//! `JWT_SECRET` must refuse to start.

use std::env;
use std::time::Duration;

use crate::ConfigError;

/// Default token lifetime: 7 days.
pub const DEFAULT_TOKEN_EXPIRY_SECS: u64 = 604_800;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime stamped into issued tokens. `None` issues tokens without an
    /// `exp` claim, which stay valid until the secret is rotated.
    pub token_expiry: Option<Duration>,
}

impl JwtConfig {
    /// Loads the configuration from the process environment.
    ///
    /// - `JWT_SECRET`: required, non-empty
    /// - `JWT_EXPIRY_SECONDS`: default `604800`, `0` disables expiry
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let expiry_secs = match lookup("JWT_EXPIRY_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: "JWT_EXPIRY_SECONDS",
                value: raw.clone(),
            })?,
            None => DEFAULT_TOKEN_EXPIRY_SECS,
        };

        Ok(Self {
            secret,
            token_expiry: (expiry_secs > 0).then(|| Duration::from_secs(expiry_secs)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let result = JwtConfig::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_blank_secret_is_fatal() {
        let result = JwtConfig::from_lookup(lookup_from(&[("JWT_SECRET", "   ")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_default_expiry() {
        let config = JwtConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.secret, "s3cret");
        assert_eq!(
            config.token_expiry,
            Some(Duration::from_secs(DEFAULT_TOKEN_EXPIRY_SECS))
        );
    }

    #[test]
    fn test_zero_expiry_disables_exp_claim() {
        let config = JwtConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRY_SECONDS", "0"),
        ]))
        .unwrap();
        assert!(config.token_expiry.is_none());
    }

    #[test]
    fn test_invalid_expiry_is_rejected() {
        let result = JwtConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRY_SECONDS", "1h"),
        ]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                var: "JWT_EXPIRY_SECONDS",
                value: "1h".to_string()
            }
        );
    }
}
