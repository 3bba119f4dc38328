//! Product Handlers
//!
//! Catalog reads are public; create, update and delete are admin-only
//! and arrive as multipart forms so an image can ride along with the
//! product fields.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use http::StatusCode;

use crate::api::MessageResponse;
use crate::checkout::pricing;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductStatus, ProductUpdate};
use crate::db::repository::{ProductRepository, RepoError};
use crate::files::UploadedFile;
use shared::{AppError, AppResult, ErrorCode};

/// Raw product fields as read from the multipart form
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    theme: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    status: Option<String>,
    cod_available: Option<String>,
    description: Option<String>,
    image: Option<UploadedFile>,
}

/// List all products, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all().await?;
    Ok(Json(products))
}

/// Get a single product
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo.find_by_id(&id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
    })?;

    Ok(Json(product))
}

/// Create a product (admin)
pub async fn create(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Product>)> {
    let form = read_product_form(&mut multipart).await?;

    let name = form
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, "Product name is required")
        })?;

    let price = match form.price {
        Some(raw) => parse_price(&raw)?,
        None => {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Product price is required",
            ));
        }
    };

    let data = ProductCreate {
        name,
        theme: form.theme,
        price,
        stock: form.stock.as_deref().map(parse_stock).transpose()?.unwrap_or(0),
        status: parse_status(form.status.as_deref())?,
        cod_available: form.cod_available.as_deref().map(parse_bool),
        description: form.description,
        image_url: store_image(&state, form.image).await?,
    };

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(data).await?;

    tracing::info!(product_id = ?product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin)
///
/// Only the fields present in the form change; a new image replaces
/// the stored URL, everything else keeps its current value.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<Product>> {
    let form = read_product_form(&mut multipart).await?;

    let data = ProductUpdate {
        name: form
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        theme: form.theme,
        price: form.price.as_deref().map(parse_price).transpose()?,
        stock: form.stock.as_deref().map(parse_stock).transpose()?,
        status: parse_status(form.status.as_deref())?,
        cod_available: form.cod_available.as_deref().map(parse_bool),
        description: form.description,
        image_url: store_image(&state, form.image).await?,
    };

    let repo = ProductRepository::new(state.get_db());
    let product = repo.update(&id, data).await.map_err(product_not_found)?;

    tracing::info!(product_id = %id, "Product updated");

    Ok(Json(product))
}

/// Delete a product (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let repo = ProductRepository::new(state.get_db());
    repo.delete(&id).await.map_err(product_not_found)?;

    tracing::info!(product_id = %id, "Product deleted");

    Ok(Json(MessageResponse::new("Product deleted")))
}

// ==================== Form parsing ====================

async fn read_product_form(multipart: &mut Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        if name == "image" {
            let filename = field
                .file_name()
                .map(|f| f.to_string())
                .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read image: {}", e)))?
                .to_vec();
            // An empty file part means the admin form had no image selected
            if !data.is_empty() {
                form.image = Some(UploadedFile { filename, data });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::validation(format!("Invalid multipart field: {}", e)))?;

        match name.as_str() {
            "name" => form.name = Some(value),
            "theme" => form.theme = Some(value),
            "price" => form.price = Some(value),
            "stock" => form.stock = Some(value),
            "status" => form.status = Some(value),
            "codAvailable" => form.cod_available = Some(value),
            "description" => form.description = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

fn parse_price(raw: &str) -> Result<f64, AppError> {
    let price: f64 = raw.trim().parse().map_err(|_| {
        AppError::with_message(ErrorCode::ProductInvalidPrice, format!("Invalid price: {}", raw))
    })?;

    if !price.is_finite() || price < 0.0 || price > pricing::MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("Price out of range: {}", raw),
        ));
    }

    Ok(price)
}

fn parse_stock(raw: &str) -> Result<i64, AppError> {
    let stock: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid stock value: {}", raw)))?;

    if stock < 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Stock cannot be negative",
        ));
    }

    Ok(stock)
}

fn parse_status(raw: Option<&str>) -> Result<Option<ProductStatus>, AppError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(AppError::validation),
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1" | "on")
}

async fn store_image(
    state: &ServerState,
    image: Option<UploadedFile>,
) -> Result<Option<String>, AppError> {
    match image {
        Some(file) => {
            let stored = state
                .file_store
                .save_product_image(&file.filename, &file.data)
                .await?;
            Ok(Some(stored.url))
        }
        None => Ok(None),
    }
}

fn product_not_found(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(message) => AppError::with_message(ErrorCode::ProductNotFound, message),
        other => other.into(),
    }
}
