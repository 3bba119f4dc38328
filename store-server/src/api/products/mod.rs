//! Product API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/products | GET | 商品列表 | 无 |
//! | /api/products/{id} | GET | 商品详情 | 无 |
//! | /api/products | POST | 创建商品 (multipart) | 管理员 |
//! | /api/products/{id} | PUT | 更新商品 (multipart) | 管理员 |
//! | /api/products/{id} | DELETE | 删除商品 | 管理员 |

mod handler;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Request body ceiling for product uploads. Images top out at 5 MB,
/// the rest is form fields.
const PRODUCT_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Product router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：商品目录公开可见，无需登录
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 管理路由：仅管理员可用
    let manage_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(DefaultBodyLimit::max(PRODUCT_BODY_LIMIT));

    read_routes.merge(manage_routes)
}
