use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::{ClaimId, OrderItemId, OrderNumber, PaymentId, ProductId, UserId};
use domain::{Claim, ClaimStatus, ClaimType, NewClaim, NewOrderItem, Order, OrderItem,
    OrderItemStatus};

use crate::Result;

/// The decided fields written onto a claim in one compare-and-set update.
#[derive(Debug, Clone)]
pub struct ClaimDecisionUpdate {
    /// The decided status (`APPROVED` or `REJECTED`).
    pub status: ClaimStatus,

    /// When the decision was made.
    pub processed_at: DateTime<Utc>,

    /// Who made the decision.
    pub processed_by: Option<String>,

    /// Optional decision memo.
    pub memo: Option<String>,
}

/// Core trait for entity storage backends.
///
/// All implementations must be safe for concurrent use (`Send + Sync`). List
/// lookups return rows in insertion order, which downstream views rely on as
/// the encounter order.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Orders -----------------------------------------------------------

    /// Persists a new order.
    ///
    /// Fails with [`DuplicatePaymentRef`](crate::EntityStoreError::DuplicatePaymentRef)
    /// if an order already exists for the same payment reference, and with
    /// [`DuplicateOrderNumber`](crate::EntityStoreError::DuplicateOrderNumber)
    /// on an order-number collision. Both checks are atomic with the insert.
    async fn insert_order(&self, order: Order) -> Result<()>;

    /// Loads an order by its order number.
    async fn get_order(&self, order_number: &OrderNumber) -> Result<Option<Order>>;

    /// Lists a buyer's orders in insertion order.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Returns true if any order exists for the payment reference.
    async fn payment_ref_exists(&self, payment_id: PaymentId) -> Result<bool>;

    /// Removes an order row. Only used by creation-saga rollback; the order's
    /// items must have been removed first.
    async fn delete_order(&self, order_number: &OrderNumber) -> Result<()>;

    // --- Order items ------------------------------------------------------

    /// Persists a new order item, assigning its id.
    async fn insert_order_item(&self, item: NewOrderItem) -> Result<OrderItem>;

    /// Loads an order item by id.
    async fn get_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>>;

    /// Lists the items of an order in insertion order.
    async fn items_for_order(&self, order_number: &OrderNumber) -> Result<Vec<OrderItem>>;

    /// Lists every item owned by a seller in insertion order.
    async fn items_for_seller(&self, seller_id: UserId) -> Result<Vec<OrderItem>>;

    /// Lists every item referencing a product in insertion order.
    async fn items_for_product(&self, product_id: ProductId) -> Result<Vec<OrderItem>>;

    /// Compare-and-set status update.
    ///
    /// Writes `next` only if the stored status still equals `expected`;
    /// otherwise fails with
    /// [`ItemStatusConflict`](crate::EntityStoreError::ItemStatusConflict)
    /// carrying the actual stored status. Returns the updated item.
    async fn update_item_status(
        &self,
        id: OrderItemId,
        expected: OrderItemStatus,
        next: OrderItemStatus,
    ) -> Result<OrderItem>;

    /// Removes all items of an order. Only used by creation-saga rollback.
    async fn delete_items_for_order(&self, order_number: &OrderNumber) -> Result<()>;

    // --- Claims -----------------------------------------------------------

    /// Persists a new claim with status `REQUESTED`, assigning its id.
    async fn insert_claim(&self, claim: NewClaim) -> Result<Claim>;

    /// Loads a claim by id.
    async fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>>;

    /// Lists the claims filed against an order item, optionally restricted to
    /// one claim type, in insertion order.
    ///
    /// More than one row per `(item, type)` is possible and must be returned
    /// as-is; callers decide how to treat duplicates.
    async fn claims_for_item(
        &self,
        order_item_id: OrderItemId,
        claim_type: Option<ClaimType>,
    ) -> Result<Vec<Claim>>;

    /// Compare-and-set decision update.
    ///
    /// Writes the decision only if the stored status still equals `expected`;
    /// otherwise fails with
    /// [`ClaimStatusConflict`](crate::EntityStoreError::ClaimStatusConflict).
    /// Returns the updated claim.
    async fn apply_claim_decision(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        update: ClaimDecisionUpdate,
    ) -> Result<Claim>;
}
