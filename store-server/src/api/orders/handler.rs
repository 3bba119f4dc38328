//! Order Handlers
//!
//! Checkout accepts a multipart form because the bank transfer flow
//! attaches a payment proof file next to the shipping fields. The
//! heavy lifting lives in [`crate::checkout`]; handlers only read the
//! form and shape the response.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::checkout::{CheckoutForm, CheckoutService};
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus};
use crate::db::repository::{OrderRepository, RepoError};
use crate::files::UploadedFile;
use shared::{AppError, AppResult, ErrorCode};

/// 下单响应
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order: Order,
}

/// 状态更新请求
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Place an order
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<CheckoutResponse>)> {
    let form = read_checkout_form(&mut multipart).await?;

    let service = CheckoutService::new(&state);
    let order = service.place_order(form, Some(&user)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Order created successfully".to_string(),
            order,
        }),
    ))
}

/// List all orders, newest first (admin)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_all().await?;
    Ok(Json(orders))
}

/// List the current user's orders
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_by_user(&user.id).await?;
    Ok(Json(orders))
}

/// Get a single order
///
/// Customers only see their own orders; admins see everything.
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo.find_by_id(&id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
    })?;

    if !user.is_admin() {
        let owner = order.user.as_ref().map(|u| u.to_string());
        if owner.as_deref() != Some(user.id.as_str()) {
            return Err(AppError::permission_denied(
                "You do not have access to this order",
            ));
        }
    }

    Ok(Json(order))
}

/// Update an order's status (admin)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let raw = payload
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, "Status is required"))?;

    let status: OrderStatus = raw.parse().map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidOrderStatus,
            format!("Unknown order status: {}", raw),
        )
    })?;

    let repo = OrderRepository::new(state.get_db());
    let order = repo.update_status(&id, status).await.map_err(|e| match e {
        RepoError::NotFound(message) => AppError::with_message(ErrorCode::OrderNotFound, message),
        other => other.into(),
    })?;

    tracing::info!(order_id = %id, status = status.as_str(), "Order status updated");

    Ok(Json(order))
}

// ==================== Form parsing ====================

async fn read_checkout_form(multipart: &mut Multipart) -> Result<CheckoutForm, AppError> {
    let mut form = CheckoutForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        if name == "paymentProof" {
            let filename = field
                .file_name()
                .map(|f| f.to_string())
                .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read payment proof: {}", e)))?
                .to_vec();
            // Browsers send an empty part when no file was picked
            if !data.is_empty() {
                form.payment_proof = Some(UploadedFile { filename, data });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::validation(format!("Invalid multipart field: {}", e)))?;

        match name.as_str() {
            "name" => form.name = Some(value),
            "email" => form.email = Some(value),
            "address" => form.address = Some(value),
            "city" => form.city = Some(value),
            "postalCode" => form.postal_code = Some(value),
            "phone" => form.phone = Some(value),
            "paymentMethod" => form.payment_method = Some(value),
            "items" => form.items = Some(value),
            "userId" => form.user_id = Some(value),
            _ => {}
        }
    }

    Ok(form)
}
