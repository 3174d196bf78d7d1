use std::env;

/// Listener address for the HTTP server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8132,
        }
    }
}

impl ServerConfig {
    /// Reads `BACKEND_HOST` and `BACKEND_PORT`, falling back to `0.0.0.0:8132`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("BACKEND_HOST").unwrap_or(defaults.host),
            port: env::var("BACKEND_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
