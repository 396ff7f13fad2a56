#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use projecthub_api::app::{app, AppState};
use projecthub_api::auth::TokenIssuer;
use projecthub_api::config::{AppConfig, Environment};

pub const PASSWORD: &str = "correct horse battery";

/// Response pieces the suites assert on
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A registered account and a token for it
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Full router over the in-memory store, driven with `oneshot`
pub struct TestApp {
    router: Router,
    state: AppState,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::defaults(Environment::Development);
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let tokens = Arc::new(TokenIssuer::from_config(&config.security).expect("token issuer"));
        let state = AppState::in_memory(tokens, &config);
        Self {
            router: app(state.clone(), &config),
            state,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, headers, body }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.request(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn register(&self, username: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/user/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD
            })),
        )
        .await
    }

    pub async fn login(&self, username: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/user/login",
            None,
            Some(json!({ "username": username, "password": PASSWORD })),
        )
        .await
    }

    /// Register then log in
    pub async fn signup(&self, username: &str) -> TestUser {
        let registered = self.register(username).await;
        assert_eq!(registered.status, StatusCode::OK, "register {}: {}", username, registered.body);

        let session = self.login(username).await;
        assert_eq!(session.status, StatusCode::OK, "login {}: {}", username, session.body);

        TestUser {
            id: registered.body["data"]["id"].as_str().expect("user id").to_string(),
            username: username.to_string(),
            token: session.body["data"]["token"].as_str().expect("token").to_string(),
        }
    }

    /// Register an account, grant it admin and return a token carrying the role
    pub async fn signup_admin(&self, username: &str) -> TestUser {
        let user = self.signup(username).await;
        self.state.users.promote(username).await.expect("promote");

        let session = self.login(username).await;
        TestUser {
            token: session.body["data"]["token"].as_str().expect("token").to_string(),
            ..user
        }
    }

    pub async fn create_project(&self, owner: &TestUser, name: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/project/createProject",
            Some(&owner.token),
            Some(json!({
                "name": name,
                "description": "d",
                "startDate": "2024-01-01",
                "endDate": "2024-12-31"
            })),
        )
        .await
    }

    /// Create a project and return its id
    pub async fn project_id(&self, owner: &TestUser, name: &str) -> String {
        let created = self.create_project(owner, name).await;
        assert_eq!(created.status, StatusCode::OK, "create {}: {}", name, created.body);
        created.body["data"]["id"].as_str().expect("project id").to_string()
    }
}
