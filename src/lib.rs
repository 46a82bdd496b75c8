//! 多租户任务跟踪服务
//! 访问控制引擎（权限矩阵、组织层级、可见范围、审计）及其 HTTP 接口

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
