//! Order Model
//!
//! Orders denormalize their line items: each item carries the product
//! name, price, and image captured at checkout time, so later catalog
//! edits never rewrite order history.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use surrealdb::RecordId;

/// Order ID type
pub type OrderId = RecordId;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Transfer,
    Cod,
}

impl PaymentMethod {
    /// Bank transfers must come with an uploaded proof; COD never does
    pub fn requires_proof(&self) -> bool {
        matches!(self, Self::Transfer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Cod => "cod",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transfer" => Ok(Self::Transfer),
            "cod" => Ok(Self::Cod),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

/// Line item snapshot stored inside an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub image_url: Option<String>,
}

/// Order model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_proof: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user: Option<RecordId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Create order payload (assembled by the checkout pipeline, never
/// deserialized from a client body directly)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_proof: Option<String>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user: Option<RecordId>,
}
