use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;

use quizzler::state::AppState;
use quizzler_auth::TokenService;
use quizzler_cache::{Cache, CacheConfig, MemoryStore};
use quizzler_config::{CorsConfig, JwtConfig, RateLimitConfig};
use quizzler_db::{DirectoryError, User, UserDirectory};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";

/// `UserDirectory` kept in memory. Passwords are compared as plain text.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<Vec<(User, String)>>,
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl InMemoryDirectory {
    /// How many times `find_by_id` reached this directory.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn create(&self, email: &str, password: &str) -> Result<User, DirectoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|(user, _)| user.email == email) {
            return Err(DirectoryError::EmailTaken);
        }

        let user = User {
            id: users.len() as i64 + 1,
            email: email.to_string(),
            created_at: Utc::now(),
        };
        users.push((user.clone(), password.to_string()));
        Ok(user)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DirectoryError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|(user, stored)| user.email == email && stored == password)
            .map(|(user, _)| user.clone()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub users: Arc<InMemoryDirectory>,
}

#[allow(dead_code)]
pub fn test_tokens() -> TokenService {
    TokenService::new(&JwtConfig {
        secret: TEST_SECRET.to_string(),
        token_expiry: Some(Duration::from_secs(3600)),
    })
    .unwrap()
}

pub fn setup_test_app(rate_limit_config: RateLimitConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let users = Arc::new(InMemoryDirectory::default());

    let state = AppState {
        tokens: test_tokens(),
        cache: Cache::new(store.clone(), &CacheConfig::default()),
        users: users.clone(),
        rate_limit_config,
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    };

    TestApp {
        state,
        store,
        users,
    }
}

/// Limits high enough that no test hits them by accident.
#[allow(dead_code)]
pub fn generous_limits() -> RateLimitConfig {
    RateLimitConfig {
        window: Duration::from_secs(60),
        auth_max_requests: 1_000,
        general_max_requests: 1_000,
    }
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
