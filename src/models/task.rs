//! Task domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    Work,
    Personal,
    Urgent,
    #[default]
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Work => "WORK",
            TaskCategory::Personal => "PERSONAL",
            TaskCategory::Urgent => "URGENT",
            TaskCategory::Other => "OTHER",
        }
    }
}

impl TryFrom<String> for TaskCategory {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "WORK" => Ok(TaskCategory::Work),
            "PERSONAL" => Ok(TaskCategory::Personal),
            "URGENT" => Ok(TaskCategory::Urgent),
            "OTHER" => Ok(TaskCategory::Other),
            other => Err(format!("unknown task category: {}", other)),
        }
    }
}

/// Task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub category: TaskCategory,
    pub owner_id: Uuid,
    pub organization_id: Uuid,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a new task owned by `owner_id` inside `organization_id`.
    pub fn new(req: CreateTaskRequest, owner_id: Uuid, organization_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or_default(),
            category: req.category.unwrap_or_default(),
            owner_id,
            organization_id,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, req: UpdateTaskRequest) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(description) = req.description {
            self.description = description;
        }
        if let Some(status) = req.status {
            self.status = status;
        }
        if let Some(category) = req.category {
            self.category = category;
        }
        if let Some(position) = req.position {
            self.position = position;
        }
        self.updated_at = Utc::now();
    }
}

/// Create task request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
}

/// Update task request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}
