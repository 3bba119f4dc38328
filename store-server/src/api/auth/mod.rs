//! Authentication API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/auth/register | POST | 注册顾客账号 | 无 |
//! | /api/auth/login | POST | 登录获取 JWT | 无 |
//! | /api/auth/me | GET | 当前登录用户 | JWT |

mod handler;

pub use handler::{LoginRequest, LoginResponse, RegisterResponse};

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Authentication router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
}
