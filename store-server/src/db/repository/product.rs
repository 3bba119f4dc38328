//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

/// Attempts for stock mutations. Concurrent checkouts hitting the same
/// product can collide at commit time; the losing transaction writes
/// nothing and is safe to run again.
const STOCK_MAX_ATTEMPTS: u32 = 5;
/// Base backoff between stock retry attempts
const STOCK_RETRY_DELAY_MS: u64 = 10;

/// Commit-time conflicts from the embedded engine come back as plain
/// errors; classify them by message like every other SurrealDB check.
fn is_retryable_write(err: &surrealdb::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("read or write conflict")
        || msg.contains("can be retried")
        || msg.contains("resource busy")
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// Find product by record id
    pub async fn find_by_record_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    name = $name,
                    theme = $theme,
                    price = $price,
                    stock = $stock,
                    status = $status,
                    codAvailable = $cod_available,
                    description = $description,
                    imageUrl = $image_url,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("theme", data.theme.unwrap_or_default()))
            .bind(("price", data.price))
            .bind(("stock", data.stock))
            .bind(("status", data.status.unwrap_or_default()))
            .bind(("cod_available", data.cod_available.unwrap_or(false)))
            .bind(("description", data.description.unwrap_or_default()))
            .bind(("image_url", data.image_url))
            .bind(("now", now))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = IF $has_name THEN $name ELSE name END,
                    theme = IF $has_theme THEN $theme ELSE theme END,
                    description = IF $has_description THEN $description ELSE description END,
                    price = IF $has_price THEN $price ELSE price END,
                    stock = IF $has_stock THEN $stock ELSE stock END,
                    status = IF $has_status THEN $status ELSE status END,
                    codAvailable = IF $has_cod THEN $cod_available ELSE codAvailable END,
                    imageUrl = IF $has_image THEN $image_url ELSE imageUrl END,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("has_name", data.name.is_some()))
            .bind(("name", data.name))
            .bind(("has_theme", data.theme.is_some()))
            .bind(("theme", data.theme))
            .bind(("has_description", data.description.is_some()))
            .bind(("description", data.description))
            .bind(("has_price", data.price.is_some()))
            .bind(("price", data.price))
            .bind(("has_stock", data.stock.is_some()))
            .bind(("stock", data.stock))
            .bind(("has_status", data.status.is_some()))
            .bind(("status", data.status))
            .bind(("has_cod", data.cod_available.is_some()))
            .bind(("cod_available", data.cod_available))
            .bind(("has_image", data.image_url.is_some()))
            .bind(("image_url", data.image_url))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?;

        result
            .take::<Option<Product>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Count all products
    pub async fn count_all(&self) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM product GROUP ALL")
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    // ==================== Stock reservation ====================

    /// Atomically decrement stock when enough is on hand.
    ///
    /// The decrement and the stock check run inside a single UPDATE
    /// statement, so two concurrent checkouts can never both take the
    /// last unit. Returns the updated product, or `None` when stock is
    /// below the requested quantity (nothing is written in that case).
    /// Commit conflicts with a concurrent reservation are retried with
    /// backoff; the retry re-evaluates the stock check.
    pub async fn try_reserve_stock(
        &self,
        id: &RecordId,
        quantity: i64,
    ) -> RepoResult<Option<Product>> {
        let mut attempt: u32 = 0;
        loop {
            match self.reserve_once(id, quantity).await {
                Ok(updated) => return Ok(updated),
                Err(err) => {
                    attempt += 1;
                    if attempt >= STOCK_MAX_ATTEMPTS || !is_retryable_write(&err) {
                        return Err(err.into());
                    }
                    let delay_ms = STOCK_RETRY_DELAY_MS * 2u64.pow(attempt - 1);
                    tracing::debug!(
                        product = %id,
                        attempt,
                        delay_ms,
                        "Stock reservation hit a write conflict, retrying"
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn reserve_once(
        &self,
        id: &RecordId,
        quantity: i64,
    ) -> Result<Option<Product>, surrealdb::Error> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET stock -= $qty, updatedAt = $now \
                 WHERE stock >= $qty RETURN AFTER",
            )
            .bind(("thing", id.clone()))
            .bind(("qty", quantity))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?;

        result.take(0)
    }

    /// Put previously reserved stock back (compensation path).
    ///
    /// Retried like the reservation; a lost restore would leak stock.
    pub async fn restore_stock(&self, id: &RecordId, quantity: i64) -> RepoResult<()> {
        let mut attempt: u32 = 0;
        loop {
            match self.restore_once(id, quantity).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    attempt += 1;
                    if attempt >= STOCK_MAX_ATTEMPTS || !is_retryable_write(&err) {
                        return Err(err.into());
                    }
                    let delay_ms = STOCK_RETRY_DELAY_MS * 2u64.pow(attempt - 1);
                    tracing::debug!(
                        product = %id,
                        attempt,
                        delay_ms,
                        "Stock restore hit a write conflict, retrying"
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn restore_once(&self, id: &RecordId, quantity: i64) -> Result<(), surrealdb::Error> {
        self.base
            .db()
            .query("UPDATE $thing SET stock += $qty, updatedAt = $now")
            .bind(("thing", id.clone()))
            .bind(("qty", quantity))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}
