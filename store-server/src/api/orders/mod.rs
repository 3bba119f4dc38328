//! Order API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/orders | POST | 提交订单 (multipart checkout) | JWT |
//! | /api/orders/user | GET | 当前用户的订单 | JWT |
//! | /api/orders/{id} | GET | 订单详情 (本人或管理员) | JWT |
//! | /api/orders | GET | 全部订单 | 管理员 |
//! | /api/orders/{id}/status | PATCH | 更新订单状态 | 管理员 |

mod handler;

pub use handler::{CheckoutResponse, UpdateStatusRequest};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Checkout request ceiling. Payment proofs top out at 2 MB, the rest
/// is form fields.
const CHECKOUT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 用户路由：下单与查看自己的订单
    let user_routes = Router::new()
        .route("/", post(handler::checkout))
        .route("/user", get(handler::my_orders))
        .route("/{id}", get(handler::get_by_id))
        .layer(DefaultBodyLimit::max(CHECKOUT_BODY_LIMIT));

    // 管理路由：订单总览与状态流转
    let manage_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(manage_routes)
}
