use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use common::{AddressId, ClaimId, OrderItemId, OrderNumber, PaymentId, ProductId, UserId};
use domain::{Claim, ClaimStatus, ClaimType, Money, NewClaim, NewOrderItem, Order, OrderItem,
    OrderItemStatus};

use crate::store::{ClaimDecisionUpdate, EntityStore};
use crate::{EntityStoreError, Result};

/// PostgreSQL-backed entity store.
///
/// Uniqueness is enforced by the schema (`orders_pkey`,
/// `orders_payment_id_key`); compare-and-set updates are conditional
/// `UPDATE ... WHERE status = $expected` statements.
#[derive(Clone)]
pub struct PostgresEntityStore {
    pool: PgPool,
}

impl PostgresEntityStore {
    /// Creates a new PostgreSQL entity store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running entity store migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        Ok(Order {
            order_number: OrderNumber::new(row.try_get::<String, _>("order_number")?),
            user_id: UserId::new(row.try_get("user_id")?),
            payment_id: PaymentId::new(row.try_get("payment_id")?),
            address_id: AddressId::new(row.try_get("address_id")?),
            ordered_at: row.try_get("ordered_at")?,
            total_amount: Money::from_units(row.try_get("total_amount")?),
        })
    }

    fn row_to_item(row: PgRow) -> Result<OrderItem> {
        let quantity: i32 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity)
            .map_err(|_| EntityStoreError::Decode(format!("negative quantity: {quantity}")))?;
        let status: String = row.try_get("status")?;

        Ok(OrderItem {
            id: OrderItemId::new(row.try_get("order_item_id")?),
            order_number: OrderNumber::new(row.try_get::<String, _>("order_number")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            seller_id: UserId::new(row.try_get("seller_id")?),
            quantity,
            unit_price: Money::from_units(row.try_get("unit_price")?),
            discount_price: Money::from_units(row.try_get("discount_price")?),
            shipping_fee: Money::from_units(row.try_get("shipping_fee")?),
            total_amount: Money::from_units(row.try_get("total_amount")?),
            status: OrderItemStatus::from_str(&status).map_err(EntityStoreError::Decode)?,
        })
    }

    fn row_to_claim(row: PgRow) -> Result<Claim> {
        let claim_type: String = row.try_get("claim_type")?;
        let status: String = row.try_get("status")?;

        Ok(Claim {
            id: ClaimId::new(row.try_get("claim_id")?),
            order_item_id: OrderItemId::new(row.try_get("order_item_id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            claim_type: ClaimType::from_str(&claim_type).map_err(EntityStoreError::Decode)?,
            reason: row.try_get("reason")?,
            status: ClaimStatus::from_str(&status).map_err(EntityStoreError::Decode)?,
            claimed_at: row.try_get("claimed_at")?,
            processed_at: row.try_get::<Option<DateTime<Utc>>, _>("processed_at")?,
            processed_by: row.try_get("processed_by")?,
            memo: row.try_get("memo")?,
        })
    }
}

const ORDER_COLUMNS: &str =
    "order_number, user_id, payment_id, address_id, ordered_at, total_amount";
const ITEM_COLUMNS: &str = "order_item_id, order_number, product_id, seller_id, quantity, \
     unit_price, discount_price, shipping_fee, total_amount, status";
const CLAIM_COLUMNS: &str = "claim_id, order_item_id, user_id, claim_type, reason, status, \
     claimed_at, processed_at, processed_by, memo";

#[async_trait]
impl EntityStore for PostgresEntityStore {
    async fn insert_order(&self, order: Order) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (order_number, user_id, payment_id, address_id, ordered_at, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.order_number.as_str())
        .bind(order.user_id.value())
        .bind(order.payment_id.value())
        .bind(order.address_id.value())
        .bind(order.ordered_at)
        .bind(order.total_amount.units())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                if db.constraint() == Some("orders_payment_id_key") {
                    Err(EntityStoreError::DuplicatePaymentRef(order.payment_id))
                } else {
                    Err(EntityStoreError::DuplicateOrderNumber(order.order_number))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_order(&self, order_number: &OrderNumber) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY ordered_at, order_number"
        ))
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn payment_ref_exists(&self, payment_id: PaymentId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE payment_id = $1)")
                .bind(payment_id.value())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn delete_order(&self, order_number: &OrderNumber) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE order_number = $1")
            .bind(order_number.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EntityStoreError::OrderNotFound(order_number.clone()));
        }
        Ok(())
    }

    async fn insert_order_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO order_items
                (order_number, product_id, seller_id, quantity, unit_price,
                 discount_price, shipping_fee, total_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.order_number.as_str())
        .bind(item.product_id.value())
        .bind(item.seller_id.value())
        .bind(item.quantity as i32)
        .bind(item.unit_price.units())
        .bind(item.discount_price.units())
        .bind(item.shipping_fee.units())
        .bind(item.total_amount.units())
        .bind(item.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_item(row)
    }

    async fn get_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_item_id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_item).transpose()
    }

    async fn items_for_order(&self, order_number: &OrderNumber) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_number = $1 ORDER BY order_item_id"
        ))
        .bind(order_number.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn items_for_seller(&self, seller_id: UserId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE seller_id = $1 ORDER BY order_item_id"
        ))
        .bind(seller_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn items_for_product(&self, product_id: ProductId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE product_id = $1 ORDER BY order_item_id"
        ))
        .bind(product_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn update_item_status(
        &self,
        id: OrderItemId,
        expected: OrderItemStatus,
        next: OrderItemStatus,
    ) -> Result<OrderItem> {
        let updated = sqlx::query(&format!(
            r#"
            UPDATE order_items SET status = $1
            WHERE order_item_id = $2 AND status = $3
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(next.as_str())
        .bind(id.value())
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Self::row_to_item(row),
            // Distinguish a lost race from a missing row.
            None => match self.get_order_item(id).await? {
                Some(item) => Err(EntityStoreError::ItemStatusConflict {
                    order_item_id: id,
                    expected,
                    actual: item.status,
                }),
                None => Err(EntityStoreError::OrderItemNotFound(id)),
            },
        }
    }

    async fn delete_items_for_order(&self, order_number: &OrderNumber) -> Result<()> {
        sqlx::query("DELETE FROM order_items WHERE order_number = $1")
            .bind(order_number.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_claim(&self, claim: NewClaim) -> Result<Claim> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO claims (order_item_id, user_id, claim_type, reason, status, claimed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(claim.order_item_id.value())
        .bind(claim.user_id.value())
        .bind(claim.claim_type.as_str())
        .bind(&claim.reason)
        .bind(ClaimStatus::Requested.as_str())
        .bind(claim.claimed_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_claim(row)
    }

    async fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>> {
        let row = sqlx::query(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE claim_id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_claim).transpose()
    }

    async fn claims_for_item(
        &self,
        order_item_id: OrderItemId,
        claim_type: Option<ClaimType>,
    ) -> Result<Vec<Claim>> {
        let rows = match claim_type {
            Some(claim_type) => {
                sqlx::query(&format!(
                    "SELECT {CLAIM_COLUMNS} FROM claims \
                     WHERE order_item_id = $1 AND claim_type = $2 ORDER BY claim_id"
                ))
                .bind(order_item_id.value())
                .bind(claim_type.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {CLAIM_COLUMNS} FROM claims WHERE order_item_id = $1 ORDER BY claim_id"
                ))
                .bind(order_item_id.value())
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Self::row_to_claim).collect()
    }

    async fn apply_claim_decision(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        update: ClaimDecisionUpdate,
    ) -> Result<Claim> {
        let updated = sqlx::query(&format!(
            r#"
            UPDATE claims
            SET status = $1, processed_at = $2, processed_by = $3, memo = $4
            WHERE claim_id = $5 AND status = $6
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(update.status.as_str())
        .bind(update.processed_at)
        .bind(update.processed_by.as_deref())
        .bind(update.memo.as_deref())
        .bind(id.value())
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Self::row_to_claim(row),
            None => match self.get_claim(id).await? {
                Some(claim) => Err(EntityStoreError::ClaimStatusConflict {
                    claim_id: id,
                    expected,
                    actual: claim.status,
                }),
                None => Err(EntityStoreError::ClaimNotFound(id)),
            },
        }
    }
}
