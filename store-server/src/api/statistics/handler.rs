//! Statistics Handlers
//!
//! Aggregates for the admin dashboard. Day and month windows are
//! computed in UTC; createdAt timestamps are RFC 3339 strings, so the
//! repository compares them lexicographically.

use axum::{Json, extract::State};
use chrono::Datelike;
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::OrderStatus;
use crate::db::repository::{OrderRepository, ProductRepository};
use shared::AppResult;

/// 仪表盘统计数据
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// 今日订单数
    pub today_orders: i64,
    /// 今日营收 (不含已取消订单)
    pub today_revenue: f64,
    /// 本月营收 (不含已取消订单)
    pub month_revenue: f64,
    /// 订单总数
    pub total_orders: i64,
    /// 商品总数
    pub total_products: i64,
    /// 待处理订单数
    pub pending_orders: i64,
}

/// Dashboard statistics (admin)
pub async fn dashboard(State(state): State<ServerState>) -> AppResult<Json<DashboardStats>> {
    let orders = OrderRepository::new(state.get_db());
    let products = ProductRepository::new(state.get_db());

    let now = chrono::Utc::now();
    let today = now.date_naive();
    let today_start = today
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .to_rfc3339();
    let month_start = today
        .with_day(1)
        .unwrap_or(today)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .to_rfc3339();

    let today_orders = orders.count_created_since(today_start.clone()).await?;
    let today_revenue = orders.revenue_since(today_start).await?;
    let month_revenue = orders.revenue_since(month_start).await?;
    let total_orders = orders.count_all().await?;
    let pending_orders = orders.count_by_status(OrderStatus::Pending).await?;
    let total_products = products.count_all().await?;

    Ok(Json(DashboardStats {
        today_orders,
        today_revenue,
        month_revenue,
        total_orders,
        total_products,
        pending_orders,
    }))
}
