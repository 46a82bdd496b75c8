//! 任务的 HTTP 处理器
//! 路由层已由访问闸门完成角色校验，记录级校验在服务中完成

use crate::{
    error::AppError,
    middleware::{AppState, ClientOrigin},
    models::{
        actor::Actor,
        task::{CreateTaskRequest, UpdateTaskRequest},
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 创建任务
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ClientOrigin(origin): ClientOrigin,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = state.task_service.create(&actor, req, origin).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// 列出可见任务
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let tasks = state.task_service.list(&actor).await?;

    Ok(Json(json!({
        "tasks": tasks,
        "count": tasks.len()
    })))
}

/// 获取任务详情
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let task = state.task_service.get(&actor, id).await?;
    Ok(Json(task))
}

/// 更新任务
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ClientOrigin(origin): ClientOrigin,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = state.task_service.update(&actor, id, req, origin).await?;

    Ok(Json(task))
}

/// 删除任务
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ClientOrigin(origin): ClientOrigin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.task_service.delete(&actor, id, origin).await?;

    Ok(StatusCode::NO_CONTENT)
}
