//! 测试公共模块
//! 基于内存存储构建应用状态，提供种子数据和请求辅助函数

#![allow(dead_code)]

use argon2::Params;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use task_tracker::{
    auth::PasswordHasher,
    config::{
        AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig, StorageBackend,
        StorageConfig,
    },
    middleware::AppState,
    models::{organization::Organization, role::Role, user::User},
    repository::{MemoryStore, OrganizationStore, Stores, UserStore},
    routes,
};
use tower::ServiceExt;

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new("test-secret-key-for-testing-only-min-32-chars".to_string()),
            access_token_exp_secs: 300,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            trust_proxy: true,
        },
    }
}

/// 测试应用：内存存储 + 完整路由
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        // 低成本参数，避免测试过慢
        let hasher = PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap());
        let state = Arc::new(
            AppState::build(create_test_config(), Stores::memory(store.clone()), None, hasher)
                .expect("Failed to build app state"),
        );
        let router = routes::create_router(state.clone());

        Self {
            store,
            state,
            router,
        }
    }

    /// 插入组织
    pub async fn seed_org(&self, name: &str, parent: Option<&Organization>) -> Organization {
        let org = Organization::new(name, parent.map(|p| p.id));
        OrganizationStore::insert(self.store.as_ref(), &org)
            .await
            .expect("Failed to seed organization");
        org
    }

    /// 插入用户并签发访问令牌
    pub async fn seed_user(&self, name: &str, role: Role, org: &Organization) -> (User, String) {
        let user = User::new(
            &format!("{}@example.com", name),
            name,
            "unused".to_string(),
            role,
            org,
        );
        UserStore::insert(self.store.as_ref(), &user)
            .await
            .expect("Failed to seed user");

        let token = self
            .state
            .jwt_service
            .generate_access_token(&user)
            .expect("Failed to issue token");
        (user, token)
    }

    /// 发送请求并解析 JSON 响应体
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }
}
