//! Order Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderCreate, OrderStatus};
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order in `pending` state
    pub async fn create(&self, data: OrderCreate) -> RepoResult<Order> {
        let now = chrono::Utc::now().to_rfc3339();
        let user = data.user.map(|u| u.to_string());

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE order SET
                    name = $name,
                    email = $email,
                    address = $address,
                    city = $city,
                    postalCode = $postal_code,
                    phone = $phone,
                    items = $items,
                    totalAmount = $total_amount,
                    paymentMethod = $payment_method,
                    paymentProof = $payment_proof,
                    status = $status,
                    user = $user,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("address", data.address))
            .bind(("city", data.city))
            .bind(("postal_code", data.postal_code))
            .bind(("phone", data.phone))
            .bind(("items", data.items))
            .bind(("total_amount", data.total_amount))
            .bind(("payment_method", data.payment_method))
            .bind(("payment_proof", data.payment_proof))
            .bind(("status", OrderStatus::Pending))
            .bind(("user", user))
            .bind(("now", now))
            .await?;

        let created: Option<Order> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find all orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find orders placed by a user, newest first
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let user_owned = user_id.to_string();
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $user ORDER BY createdAt DESC")
            .bind(("user", user_owned))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Overwrite the order status
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> RepoResult<Order> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status, updatedAt = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("status", status))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?;

        result
            .take::<Option<Order>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    // ==================== Statistics ====================

    /// Count all orders
    pub async fn count_all(&self) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM order GROUP ALL")
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Count orders created at or after the given RFC 3339 instant
    pub async fn count_created_since(&self, since: String) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM order WHERE createdAt >= $since GROUP ALL")
            .bind(("since", since))
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Count orders currently in the given status
    pub async fn count_by_status(&self, status: OrderStatus) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM order WHERE status = $status GROUP ALL")
            .bind(("status", status))
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Sum of totalAmount for orders created at or after the given instant.
    ///
    /// Cancelled orders do not count toward revenue.
    pub async fn revenue_since(&self, since: String) -> RepoResult<f64> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT math::sum(totalAmount) AS revenue FROM order \
                 WHERE createdAt >= $since AND status != $excluded GROUP ALL",
            )
            .bind(("since", since))
            .bind(("excluded", OrderStatus::Cancelled))
            .await?;
        let row: Option<RevenueRow> = result.take(0)?;
        Ok(row.map(|r| r.revenue).unwrap_or(0.0))
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct RevenueRow {
    revenue: f64,
}
