//! Request gate
//!
//! Every gated route declares the [`Operation`] it performs. The gate layer
//! reads the authenticated [`Actor`] and checks the operation against the
//! permission matrix before the handler runs.

use super::{matrix::PermissionMatrix, scope::authorize_with};
use crate::{
    error::AppError,
    models::{
        actor::Actor,
        role::{Action, ResourceKind},
    },
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};
use std::sync::Arc;

/// Declared (resource, action) pair of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub resource: ResourceKind,
    pub action: Action,
}

impl Operation {
    pub const fn new(name: &'static str, resource: ResourceKind, action: Action) -> Self {
        Self {
            name,
            resource,
            action,
        }
    }
}

pub const TASK_CREATE: Operation = Operation::new("task.create", ResourceKind::Task, Action::Create);
pub const TASK_LIST: Operation = Operation::new("task.list", ResourceKind::Task, Action::Read);
pub const TASK_GET: Operation = Operation::new("task.get", ResourceKind::Task, Action::Read);
pub const TASK_UPDATE: Operation = Operation::new("task.update", ResourceKind::Task, Action::Update);
pub const TASK_DELETE: Operation = Operation::new("task.delete", ResourceKind::Task, Action::Delete);
pub const AUDIT_LOG_LIST: Operation =
    Operation::new("audit_log.list", ResourceKind::AuditLog, Action::Read);
pub const USER_LIST: Operation = Operation::new("user.list", ResourceKind::User, Action::Read);
pub const USER_CREATE: Operation = Operation::new("user.create", ResourceKind::User, Action::Create);
pub const ORGANIZATION_LIST: Operation =
    Operation::new("organization.list", ResourceKind::Organization, Action::Read);
pub const ORGANIZATION_CREATE: Operation =
    Operation::new("organization.create", ResourceKind::Organization, Action::Create);

/// Builds per-route gate layers around the shared matrix.
#[derive(Clone)]
pub struct Gate {
    matrix: Arc<PermissionMatrix>,
}

#[derive(Clone)]
struct GateState {
    matrix: Arc<PermissionMatrix>,
    operation: Operation,
}

impl Gate {
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self { matrix }
    }

    /// Wrap `route` so it only runs when the actor may perform `operation`.
    pub fn guard<S>(&self, operation: Operation, route: MethodRouter<S>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        route.route_layer(axum::middleware::from_fn_with_state(
            GateState {
                matrix: self.matrix.clone(),
                operation,
            },
            enforce,
        ))
    }
}

async fn enforce(
    State(gate): State<GateState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 认证中间件负责附加 Actor；缺失即未认证
    let actor = req
        .extensions()
        .get::<Actor>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    let operation = gate.operation;
    authorize_with(&gate.matrix, &actor, operation.resource, operation.action)?;

    tracing::debug!(
        user_id = %actor.user_id,
        operation = operation.name,
        "Operation authorized"
    );

    Ok(next.run(req).await)
}
