//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use quill_api::AppState;
use quill_auth::store::{MemoryRefreshTokenStore, MemoryUserStore};
use quill_auth::{PasswordHasher, SessionProtocol, TokenSigner};
use quill_core::config::{AppConfig, AuthConfig, DatabaseConfig, StoreProvider};

/// Password that satisfies the registration rules.
pub const PASSWORD: &str = "Password1";

/// Test application over in-memory stores
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Refresh token store, for direct inspection
    pub tokens: MemoryRefreshTokenStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let config = test_config();
        config.validate().expect("Test config is invalid");

        let tokens = MemoryRefreshTokenStore::new();
        let protocol = SessionProtocol::new(
            Arc::new(TokenSigner::new(&config.auth)),
            Arc::new(MemoryUserStore::new()),
            Arc::new(tokens.clone()),
            Arc::new(PasswordHasher::new(&config.auth).expect("Invalid hasher params")),
        );

        let state = AppState::new(Arc::new(config.clone()), Arc::new(protocol));
        let router = quill_api::build_app(state);

        Self {
            router,
            tokens,
            config,
        }
    }

    /// Register a user and return the response
    pub async fn register(&self, username: &str, email: &str) -> TestResponse {
        let body = serde_json::json!({
            "username": username,
            "name": "Test User",
            "email": email,
            "password": PASSWORD,
            "confirmpassword": PASSWORD,
        });
        self.request("POST", "/api/v1/register", Some(body), None)
            .await
    }

    /// Register a user and return its session cookies
    pub async fn register_session(&self, username: &str) -> Session {
        let response = self
            .register(username, &format!("{username}@example.com"))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        Session::from_response(&response)
    }

    /// Log in and return the response
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        self.request("POST", "/api/v1/login", Some(body), None)
            .await
    }

    /// Make an HTTP request to the test app, optionally with a `Cookie` header
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();

        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            set_cookies,
        }
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: Default::default(),
        database: DatabaseConfig {
            provider: StoreProvider::Memory,
            ..DatabaseConfig::default()
        },
        auth: AuthConfig {
            access_token_secret: "integration-access-secret".to_string(),
            refresh_token_secret: "integration-refresh-secret".to_string(),
            password_memory_kib: 1024,
            password_iterations: 1,
            password_parallelism: 1,
            ..AuthConfig::default()
        },
        logging: Default::default(),
    }
}

/// `name=value; Attr...` to `(name, value)`.
fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    Some((name.trim().to_string(), value.trim().to_string()))
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// Cookies set by the response, by name
    pub set_cookies: HashMap<String, String>,
}

impl TestResponse {
    /// Value of a cookie set by this response
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.set_cookies.get(name).map(String::as_str)
    }

    /// Whether this response told the client to drop the cookie
    pub fn cleared(&self, name: &str) -> bool {
        self.cookie(name) == Some("")
    }

    /// The `user.username` field of a session response
    pub fn username(&self) -> Option<&str> {
        self.body.pointer("/user/username").and_then(Value::as_str)
    }
}

/// The cookie pair a browser would hold
#[derive(Debug, Clone)]
pub struct Session {
    pub access: String,
    pub refresh: String,
}

impl Session {
    /// Take both cookies from a successful response
    pub fn from_response(response: &TestResponse) -> Self {
        Self {
            access: response
                .cookie("accessToken")
                .expect("No accessToken cookie")
                .to_string(),
            refresh: response
                .cookie("refreshToken")
                .expect("No refreshToken cookie")
                .to_string(),
        }
    }

    /// `Cookie` request header carrying both tokens
    pub fn header(&self) -> String {
        format!("accessToken={}; refreshToken={}", self.access, self.refresh)
    }
}
