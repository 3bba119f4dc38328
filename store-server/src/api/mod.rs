//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查接口
//! - [`auth`] - 注册 / 登录 / 当前用户
//! - [`products`] - 商品目录与管理接口
//! - [`orders`] - 下单与订单管理接口
//! - [`users`] - 个人资料接口
//! - [`statistics`] - 管理后台统计接口
//! - [`upload`] - 上传文件访问接口

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod statistics;
pub mod upload;
pub mod users;

use serde::Serialize;

// Re-export common types for handlers
pub use shared::{AppError, AppResult};

/// Plain `{ "message": ... }` body used by delete and status endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Flatten validator output into a single readable message
///
/// `validator` reports errors per field; the storefront only shows one
/// line, so the first field message wins.
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            return match &error.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for field '{}'", field),
            };
        }
    }
    "Validation failed".to_string()
}
