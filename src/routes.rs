//! 路由注册
//! 创建所有 API 路由并应用中间件
//!
//! 每个需要授权的方法路由都通过 `Gate::guard` 声明其操作

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    access::gate::{
        AUDIT_LOG_LIST, ORGANIZATION_CREATE, ORGANIZATION_LIST, TASK_CREATE, TASK_DELETE,
        TASK_GET, TASK_LIST, TASK_UPDATE, USER_CREATE, USER_LIST,
    },
    handlers,
    middleware::AppState,
};

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let gate = &state.gate;

    // 公开端点（健康检查、注册、登录）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route("/api/v1/auth/me", get(handlers::auth::me))
        // 任务
        .route(
            "/api/v1/tasks",
            gate.guard(TASK_LIST, get(handlers::task::list_tasks))
                .merge(gate.guard(TASK_CREATE, post(handlers::task::create_task))),
        )
        .route(
            "/api/v1/tasks/{id}",
            gate.guard(TASK_GET, get(handlers::task::get_task))
                .merge(gate.guard(TASK_UPDATE, axum::routing::put(handlers::task::update_task)))
                .merge(gate.guard(TASK_DELETE, axum::routing::delete(handlers::task::delete_task))),
        )
        // 审计日志
        .route(
            "/api/v1/audit-log",
            gate.guard(AUDIT_LOG_LIST, get(handlers::audit::list_audit_logs)),
        )
        // 用户管理
        .route(
            "/api/v1/users",
            gate.guard(USER_LIST, get(handlers::user::list_users))
                .merge(gate.guard(USER_CREATE, post(handlers::user::create_user))),
        )
        // 组织管理
        .route(
            "/api/v1/organizations",
            gate.guard(ORGANIZATION_LIST, get(handlers::organization::list_organizations))
                .merge(gate.guard(
                    ORGANIZATION_CREATE,
                    post(handlers::organization::create_organization),
                )),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            crate::auth::middleware::jwt_auth_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(
                    crate::middleware::request_tracking_middleware,
                ))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
