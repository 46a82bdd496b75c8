//! HTTP 中间件与应用状态
//! 请求追踪、客户端来源地址解析

use crate::{
    access::{AccessScope, AuditRecorder, Gate, PermissionMatrix},
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    error::AppError,
    repository::Stores,
    services::{AuditLogService, AuthService, OrganizationService, TaskService, UserService},
};
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 服务以 Arc 共享，Clone 只复制指针
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// memory 后端时为 None
    pub db: Option<PgPool>,
    pub jwt_service: Arc<JwtService>,
    pub gate: Gate,
    pub auth_service: Arc<AuthService>,
    pub task_service: Arc<TaskService>,
    pub audit_log_service: Arc<AuditLogService>,
    pub user_service: Arc<UserService>,
    pub organization_service: Arc<OrganizationService>,
}

impl AppState {
    /// 组装权限矩阵、访问范围、审计记录器和各业务服务
    ///
    /// 权限矩阵配置错误在此处失败，进程不应继续启动
    pub fn build(
        config: AppConfig,
        stores: Stores,
        db: Option<PgPool>,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let matrix = Arc::new(
            PermissionMatrix::standard().map_err(|e| AppError::Config(e.to_string()))?,
        );
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let hasher = Arc::new(hasher);

        let scope = AccessScope::new(matrix.clone(), stores.organizations.clone());
        let recorder = AuditRecorder::new(stores.audit.clone());

        let auth_service = Arc::new(AuthService::new(
            stores.users.clone(),
            stores.organizations.clone(),
            jwt_service.clone(),
            hasher.clone(),
            config.security.clone(),
        ));
        let task_service = Arc::new(TaskService::new(
            stores.tasks.clone(),
            scope.clone(),
            recorder.clone(),
        ));
        let audit_log_service = Arc::new(AuditLogService::new(stores.audit.clone(), scope.clone()));
        let user_service = Arc::new(UserService::new(
            stores.users.clone(),
            stores.organizations.clone(),
            scope.clone(),
            recorder.clone(),
            hasher,
            config.security.clone(),
        ));
        let organization_service = Arc::new(OrganizationService::new(
            stores.organizations.clone(),
            scope,
            recorder,
        ));

        Ok(Self {
            config,
            db,
            jwt_service,
            gate: Gate::new(matrix),
            auth_service,
            task_service,
            audit_log_service,
            user_service,
            organization_service,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 标签取值保持有限集合
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "OTHER",
        };
        let status_class = match status {
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_class)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中返回追踪标识
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// 客户端来源地址（写入审计事件的 origin）
///
/// 信任代理时优先读取 X-Forwarded-For / X-Real-IP，否则使用连接地址
pub fn client_origin(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> Option<String> {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            tracing::debug!(client_ip = %ip, "Got client IP from proxy headers");
            return Some(ip.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<&str> {
    // X-Forwarded-For 可能包含多个 IP，取第一个
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    forwarded.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

/// 审计来源提取器
///
/// 连接地址由 `into_make_service_with_connect_info` 写入请求扩展
pub struct ClientOrigin(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for ClientOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientOrigin(client_origin(
            &parts.headers,
            peer,
            state.config.security.trust_proxy,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }

    #[test]
    fn test_client_origin_requires_trusted_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());

        assert_eq!(client_origin(&headers, None, false), None);
        assert_eq!(client_origin(&headers, None, true).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_origin_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());

        assert_eq!(client_origin(&headers, None, true).as_deref(), Some("198.51.100.4"));
        assert_eq!(client_origin(&HeaderMap::new(), None, true), None);
    }

    #[test]
    fn test_client_origin_falls_back_to_peer_address() {
        let peer: SocketAddr = "192.0.2.10:51234".parse().unwrap();
        let mut spoofed = HeaderMap::new();
        spoofed.insert("x-forwarded-for", "203.0.113.7".parse().unwrap());

        // 不信任代理时忽略请求头
        assert_eq!(client_origin(&spoofed, Some(peer), false).as_deref(), Some("192.0.2.10"));
        // 信任代理但缺少请求头
        assert_eq!(
            client_origin(&HeaderMap::new(), Some(peer), true).as_deref(),
            Some("192.0.2.10")
        );
        assert_eq!(client_origin(&spoofed, Some(peer), true).as_deref(), Some("203.0.113.7"));
    }
}
