//! JWT 认证中间件
//! 验证 Bearer 令牌并把调用者身份（Actor）附加到请求扩展

use crate::{auth::jwt::JwtService, error::AppError, models::actor::Actor};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

// 实现 FromRequestParts 以便在 handler 中直接提取 Actor
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    let claims = jwt_service.validate_access_token(&token)?;
    let actor = claims.actor()?;

    tracing::debug!(
        user_id = %actor.user_id,
        role = %actor.role,
        organization_id = %actor.organization_id,
        "Request authenticated"
    );

    // 附加到请求扩展，供访问闸门和 handler 使用
    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
