//! 组织管理的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::{AppState, ClientOrigin},
    models::{actor::Actor, organization::CreateOrganizationRequest},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 列出可见组织
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let organizations = state.organization_service.list(&actor).await?;

    Ok(Json(json!({
        "organizations": organizations,
        "count": organizations.len()
    })))
}

/// 创建子组织
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ClientOrigin(origin): ClientOrigin,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let organization = state.organization_service.create(&actor, req, origin).await?;

    Ok((StatusCode::CREATED, Json(organization)))
}
