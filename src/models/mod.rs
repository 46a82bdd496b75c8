//! 数据模型模块

pub mod actor;
pub mod audit;
pub mod organization;
pub mod role;
pub mod task;
pub mod user;
