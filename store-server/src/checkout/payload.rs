//! Checkout form validation
//!
//! Turns the raw multipart fields into a validated checkout request.
//! Everything here is shape validation only; stock and pricing checks
//! happen later against the catalog.

use serde::Deserialize;
use shared::{AppError, ErrorCode};

use crate::db::models::PaymentMethod;
use crate::files::UploadedFile;

/// Raw checkout fields as read from the multipart form
#[derive(Debug, Default)]
pub struct CheckoutForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<String>,
    pub items: Option<String>,
    pub user_id: Option<String>,
    pub payment_proof: Option<UploadedFile>,
}

/// One cart line as sent by the client
///
/// The product reference historically appeared under `product`, `_id`
/// or `id` depending on the client, so all three spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItemInput {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, rename = "_id")]
    pub legacy_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl CheckoutItemInput {
    /// The product reference, whichever field carried it
    pub fn product_ref(&self) -> Option<&str> {
        self.product
            .as_deref()
            .or(self.legacy_id.as_deref())
            .or(self.id.as_deref())
    }

    /// Requested quantity; absent or non-positive values default to 1
    pub fn effective_quantity(&self) -> i64 {
        match self.quantity {
            Some(q) if q > 0 => q,
            _ => 1,
        }
    }
}

/// A checkout request that passed shape validation
#[derive(Debug)]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<CheckoutItemInput>,
    pub user_id: Option<String>,
    pub payment_proof: Option<UploadedFile>,
}

fn required(value: Option<String>, label: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, format!("{} is required", label))
        })
}

impl CheckoutRequest {
    /// Validate shape: required shipping fields, a known payment method,
    /// a non-empty cart, and a proof when paying by bank transfer.
    pub fn from_form(form: CheckoutForm) -> Result<Self, AppError> {
        let name = required(form.name, "Name")?;
        let email = required(form.email, "Email")?;
        let address = required(form.address, "Address")?;
        let city = required(form.city, "City")?;
        let postal_code = required(form.postal_code, "Postal code")?;
        let phone = required(form.phone, "Phone")?;

        let method_raw = required(form.payment_method, "Payment method")?;
        let payment_method: PaymentMethod = method_raw.parse().map_err(|_| {
            AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                format!("Unknown payment method: {}", method_raw),
            )
        })?;

        let items_raw = form
            .items
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::new(ErrorCode::OrderEmpty))?;
        let items: Vec<CheckoutItemInput> = serde_json::from_str(&items_raw)
            .map_err(|e| AppError::validation(format!("Invalid items payload: {}", e)))?;
        if items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        if payment_method.requires_proof() && form.payment_proof.is_none() {
            return Err(AppError::new(ErrorCode::PaymentProofRequired));
        }

        Ok(Self {
            name,
            email,
            address,
            city,
            postal_code,
            phone,
            payment_method,
            items,
            user_id: form.user_id.filter(|s| !s.trim().is_empty()),
            payment_proof: form.payment_proof,
        })
    }
}
