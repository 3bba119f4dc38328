//! Checkout Pipeline
//!
//! Turns a submitted cart into a persisted order in four stages:
//!
//! 1. Shape validation of the multipart form ([`payload`])
//! 2. Catalog validation: every referenced product must exist, carry a
//!    sane price, and have enough stock on hand
//! 3. Stock reservation: one conditional decrement per line, with
//!    compensating restores when a later line or the final write fails
//! 4. Order assembly: denormalized item snapshots, server-computed
//!    total (catalog prices plus flat shipping fee), `pending` status
//!
//! Client-submitted prices and totals are ignored throughout.

pub mod payload;
pub mod pricing;

pub use payload::{CheckoutForm, CheckoutItemInput, CheckoutRequest};

use shared::{AppError, ErrorCode};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderItem, Product};
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::files::FileStore;

/// A validated cart line bound to a catalog product
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: RecordId,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub image_url: Option<String>,
}

impl OrderLine {
    fn into_item(self) -> OrderItem {
        OrderItem {
            product: self.product_id,
            name: self.name,
            price: self.unit_price,
            quantity: self.quantity,
            image_url: self.image_url,
        }
    }
}

/// Resolve the order owner: an authenticated principal wins over the
/// `userId` form field; a malformed reference is dropped rather than
/// failing the checkout.
fn resolve_user(principal: Option<&CurrentUser>, body_user: Option<&str>) -> Option<RecordId> {
    let reference = principal.map(|u| u.id.as_str()).or(body_user)?;
    let id = if reference.contains(':') {
        reference.parse::<RecordId>().ok()
    } else {
        Some(RecordId::from_table_key("user", reference))
    };
    if id.is_none() {
        tracing::warn!(user = %reference, "Ignoring malformed user reference on checkout");
    }
    id
}

/// Checkout orchestration over the catalog and order repositories
pub struct CheckoutService {
    products: ProductRepository,
    orders: OrderRepository,
    file_store: FileStore,
    shipping_fee: f64,
}

impl CheckoutService {
    pub fn new(state: &ServerState) -> Self {
        Self {
            products: ProductRepository::new(state.get_db()),
            orders: OrderRepository::new(state.get_db()),
            file_store: state.file_store.clone(),
            shipping_fee: state.config.shipping_fee,
        }
    }

    /// Run the full checkout pipeline and persist the order
    pub async fn place_order(
        &self,
        form: CheckoutForm,
        principal: Option<&CurrentUser>,
    ) -> Result<Order, AppError> {
        let request = CheckoutRequest::from_form(form)?;
        let lines = self.validate_items(&request.items).await?;

        // Store the proof before touching stock so a bad file never
        // leaves a reservation behind
        let payment_proof = match &request.payment_proof {
            Some(file) => Some(
                self.file_store
                    .save_payment_proof(&file.filename, &file.data)
                    .await?
                    .url,
            ),
            None => None,
        };

        self.reserve(&lines).await?;

        let total_amount = pricing::order_total(
            lines
                .iter()
                .map(|l| pricing::line_total(l.unit_price, l.quantity)),
            self.shipping_fee,
        );

        let user = resolve_user(principal, request.user_id.as_deref());

        let order = OrderCreate {
            name: request.name,
            email: request.email,
            address: request.address,
            city: request.city,
            postal_code: request.postal_code,
            phone: request.phone,
            items: lines.iter().cloned().map(OrderLine::into_item).collect(),
            total_amount,
            payment_method: request.payment_method,
            payment_proof,
            user,
        };

        match self.orders.create(order).await {
            Ok(order) => {
                tracing::info!(
                    order_id = ?order.id,
                    total = total_amount,
                    items = lines.len(),
                    "Order placed"
                );
                Ok(order)
            }
            Err(e) => {
                // The write failed after stock was taken; put it back
                self.release(&lines).await;
                Err(e.into())
            }
        }
    }

    /// Resolve every cart line against the catalog.
    ///
    /// Read-only pass: nothing is decremented here, so a failure on the
    /// third line leaves the first two untouched.
    async fn validate_items(
        &self,
        items: &[CheckoutItemInput],
    ) -> Result<Vec<OrderLine>, AppError> {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let reference = item
                .product_ref()
                .ok_or_else(|| AppError::validation("Cart item is missing a product reference"))?;
            let quantity = item.effective_quantity();
            pricing::validate_quantity(quantity)?;

            let product = self.lookup(reference).await?;
            pricing::validate_price(product.price)?;

            if product.stock < quantity {
                return Err(AppError::insufficient_stock(
                    &product.name,
                    product.stock,
                    quantity,
                ));
            }

            let product_id = product
                .id
                .ok_or_else(|| AppError::internal("Product record is missing an id"))?;
            lines.push(OrderLine {
                product_id,
                name: product.name,
                unit_price: product.price,
                quantity,
                image_url: product.image_url,
            });
        }
        Ok(lines)
    }

    async fn lookup(&self, reference: &str) -> Result<Product, AppError> {
        let not_found = || {
            AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Product not found: {}", reference),
            )
            .with_detail("product", reference)
        };

        let id = if reference.contains(':') {
            match reference.parse::<RecordId>() {
                Ok(id) => id,
                Err(_) => return Err(not_found()),
            }
        } else {
            RecordId::from_table_key("product", reference)
        };

        match self.products.find_by_record_id(&id).await? {
            Some(product) => Ok(product),
            None => Err(not_found()),
        }
    }

    /// Take stock for every line, all or nothing.
    ///
    /// Each line is a single conditional decrement; when one fails, the
    /// decrements already applied are rolled back before returning.
    async fn reserve(&self, lines: &[OrderLine]) -> Result<(), AppError> {
        let mut reserved: Vec<&OrderLine> = Vec::new();
        for line in lines {
            match self
                .products
                .try_reserve_stock(&line.product_id, line.quantity)
                .await
            {
                Ok(Some(_)) => reserved.push(line),
                Ok(None) => {
                    // Lost a race since the read pass, or the product vanished
                    let available = self
                        .products
                        .find_by_record_id(&line.product_id)
                        .await
                        .ok()
                        .flatten()
                        .map(|p| p.stock)
                        .unwrap_or(0);
                    let err = AppError::insufficient_stock(&line.name, available, line.quantity);
                    self.release(reserved.iter().copied()).await;
                    return Err(err);
                }
                Err(e) => {
                    self.release(reserved.iter().copied()).await;
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Best-effort compensation: restore previously taken stock
    async fn release<'a>(&self, lines: impl IntoIterator<Item = &'a OrderLine>) {
        let lines: Vec<&OrderLine> = lines.into_iter().collect();
        let restores = lines
            .iter()
            .map(|l| self.products.restore_stock(&l.product_id, l.quantity));
        for (line, result) in lines.iter().zip(futures::future::join_all(restores).await) {
            if let Err(e) = result {
                tracing::error!(
                    product = %line.product_id,
                    quantity = line.quantity,
                    error = %e,
                    "Failed to restore reserved stock"
                );
            }
        }
    }
}
