//! Statistics API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/statistics | GET | 管理后台仪表盘统计 | 管理员 |

mod handler;

pub use handler::DashboardStats;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Statistics router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::dashboard))
        .layer(middleware::from_fn(require_admin))
}
