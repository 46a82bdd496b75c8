//! 审计日志的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::{actor::Actor, audit::AuditLogQuery},
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 查询审计日志（最新在前）
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = state.audit_log_service.list(&actor, query).await?;

    Ok(Json(json!({
        "events": events,
        "count": events.len()
    })))
}
