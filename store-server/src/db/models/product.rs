//! Product Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use surrealdb::RecordId;

/// Product ID type
pub type ProductId = RecordId;

/// Product availability status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("Unknown product status: {}", other)),
        }
    }
}

/// Product model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub theme: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub cod_available: bool,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub theme: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub status: Option<ProductStatus>,
    pub cod_available: Option<bool>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub theme: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub cod_available: Option<bool>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
