//! Business logic services layer

pub mod audit_service;
pub mod auth_service;
pub mod organization_service;
pub mod task_service;
pub mod user_service;

pub use audit_service::AuditLogService;
pub use auth_service::AuthService;
pub use organization_service::OrganizationService;
pub use task_service::TaskService;
pub use user_service::UserService;
