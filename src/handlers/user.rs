//! 用户管理的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::{AppState, ClientOrigin},
    models::{actor::Actor, user::*},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 列出可见用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let users = state.user_service.list(&actor).await?;

    let user_responses: Vec<UserResponse> = users.into_iter().map(|u| u.into()).collect();

    Ok(Json(json!({
        "users": user_responses,
        "count": user_responses.len()
    })))
}

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ClientOrigin(origin): ClientOrigin,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.create(&actor, req, origin).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
