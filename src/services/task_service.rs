//! 任务服务：访问控制下的任务增删改查
//! 每次成功的变更在存储写入后记录一条审计事件

use crate::{
    access::{AccessScope, AuditEntry, AuditRecorder},
    error::{AppError, Result},
    models::{
        actor::Actor,
        role::{Action, ResourceKind},
        task::{CreateTaskRequest, Task, UpdateTaskRequest},
    },
    repository::TaskStore,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    scope: AccessScope,
    recorder: AuditRecorder,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, scope: AccessScope, recorder: AuditRecorder) -> Self {
        Self {
            tasks,
            scope,
            recorder,
        }
    }

    /// 创建任务（所有者和组织取自调用者）
    pub async fn create(
        &self,
        actor: &Actor,
        req: CreateTaskRequest,
        origin: Option<String>,
    ) -> Result<Task> {
        self.scope.authorize(actor, ResourceKind::Task, Action::Create)?;
        req.validate()?;

        let task = Task::new(req, actor.user_id, actor.organization_id);
        self.tasks.insert(&task).await?;

        tracing::info!(task_id = %task.id, owner_id = %task.owner_id, "Task created");

        self.audit(
            AuditEntry::new(
                actor,
                Action::Create,
                ResourceKind::Task,
                task.id,
                format!("Created task \"{}\"", task.title),
            )
            .with_origin(origin),
        )
        .await;

        Ok(task)
    }

    /// 列出调用者可见的任务
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Task>> {
        self.scope.authorize(actor, ResourceKind::Task, Action::Read)?;

        let filter = self.scope.visibility_filter(actor).await?;
        self.tasks.list(&filter).await
    }

    /// 获取单个任务
    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Task> {
        self.scope.authorize(actor, ResourceKind::Task, Action::Read)?;
        self.load_visible(actor, id).await
    }

    /// 更新任务
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        req: UpdateTaskRequest,
        origin: Option<String>,
    ) -> Result<Task> {
        self.scope.authorize(actor, ResourceKind::Task, Action::Update)?;
        req.validate()?;

        let mut task = self.load_visible(actor, id).await?;
        task.apply(req);

        // 读取与写入之间记录可能已被删除
        if !self.tasks.update(&task).await? {
            return Err(AppError::not_found("Task"));
        }

        self.audit(
            AuditEntry::new(
                actor,
                Action::Update,
                ResourceKind::Task,
                task.id,
                format!("Updated task \"{}\"", task.title),
            )
            .with_origin(origin),
        )
        .await;

        Ok(task)
    }

    /// 删除任务
    pub async fn delete(&self, actor: &Actor, id: Uuid, origin: Option<String>) -> Result<()> {
        self.scope.authorize(actor, ResourceKind::Task, Action::Delete)?;

        let task = self.load_visible(actor, id).await?;

        if !self.tasks.delete(task.id).await? {
            return Err(AppError::not_found("Task"));
        }

        self.audit(
            AuditEntry::new(
                actor,
                Action::Delete,
                ResourceKind::Task,
                task.id,
                format!("Deleted task \"{}\"", task.title),
            )
            .with_origin(origin),
        )
        .await;

        Ok(())
    }

    async fn load_visible(&self, actor: &Actor, id: Uuid) -> Result<Task> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))?;

        self.scope.check_record(actor, ResourceKind::Task, &task).await?;
        Ok(task)
    }

    async fn audit(&self, entry: AuditEntry) {
        // 审计失败已由记录器上报，不影响业务结果
        let _ = self.recorder.record(entry).await;
    }
}
