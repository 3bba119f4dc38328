//! User Profile API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/users/profile | GET | 获取个人资料 | JWT |
//! | /api/users/profile | PUT | 更新个人资料 | JWT |
//! | /api/users/profile/password | PUT | 修改密码 | JWT |

mod handler;

pub use handler::ChangePasswordRequest;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// User profile router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/profile",
            get(handler::get_profile).put(handler::update_profile),
        )
        .route("/profile/password", put(handler::change_password))
}
