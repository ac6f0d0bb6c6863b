use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{ClaimId, OrderItemId, OrderNumber, PaymentId, ProductId, UserId};
use domain::{Claim, ClaimStatus, ClaimType, NewClaim, NewOrderItem, Order, OrderItem,
    OrderItemStatus};

use crate::store::{ClaimDecisionUpdate, EntityStore};
use crate::{EntityStoreError, Result};

#[derive(Default)]
struct State {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    claims: Vec<Claim>,
    next_item_id: i64,
    next_claim_id: i64,
}

/// In-memory entity store.
///
/// The reference implementation used throughout the test suites. Uniqueness
/// and compare-and-set guarantees hold because every write runs under a
/// single write lock.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryEntityStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of stored order items.
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }

    /// Returns the number of stored claims.
    pub async fn claim_count(&self) -> usize {
        self.state.read().await.claims.len()
    }

    /// Clears all stored entities.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.orders.clear();
        state.items.clear();
        state.claims.clear();
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn insert_order(&self, order: Order) -> Result<()> {
        let mut state = self.state.write().await;

        if state.orders.iter().any(|o| o.payment_id == order.payment_id) {
            return Err(EntityStoreError::DuplicatePaymentRef(order.payment_id));
        }
        if state
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(EntityStoreError::DuplicateOrderNumber(order.order_number));
        }

        state.orders.push(order);
        Ok(())
    }

    async fn get_order(&self, order_number: &OrderNumber) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .find(|o| &o.order_number == order_number)
            .cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn payment_ref_exists(&self, payment_id: PaymentId) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.orders.iter().any(|o| o.payment_id == payment_id))
    }

    async fn delete_order(&self, order_number: &OrderNumber) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.orders.len();
        state.orders.retain(|o| &o.order_number != order_number);
        if state.orders.len() == before {
            return Err(EntityStoreError::OrderNotFound(order_number.clone()));
        }
        Ok(())
    }

    async fn insert_order_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        let mut state = self.state.write().await;
        state.next_item_id += 1;
        let stored = OrderItem {
            id: OrderItemId::new(state.next_item_id),
            order_number: item.order_number,
            product_id: item.product_id,
            seller_id: item.seller_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount_price: item.discount_price,
            shipping_fee: item.shipping_fee,
            total_amount: item.total_amount,
            status: item.status,
        };
        state.items.push(stored.clone());
        Ok(stored)
    }

    async fn get_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>> {
        let state = self.state.read().await;
        Ok(state.items.iter().find(|i| i.id == id).cloned())
    }

    async fn items_for_order(&self, order_number: &OrderNumber) -> Result<Vec<OrderItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|i| &i.order_number == order_number)
            .cloned()
            .collect())
    }

    async fn items_for_seller(&self, seller_id: UserId) -> Result<Vec<OrderItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|i| i.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn items_for_product(&self, product_id: ProductId) -> Result<Vec<OrderItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn update_item_status(
        &self,
        id: OrderItemId,
        expected: OrderItemStatus,
        next: OrderItemStatus,
    ) -> Result<OrderItem> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(EntityStoreError::OrderItemNotFound(id))?;

        if item.status != expected {
            return Err(EntityStoreError::ItemStatusConflict {
                order_item_id: id,
                expected,
                actual: item.status,
            });
        }

        item.status = next;
        Ok(item.clone())
    }

    async fn delete_items_for_order(&self, order_number: &OrderNumber) -> Result<()> {
        let mut state = self.state.write().await;
        state.items.retain(|i| &i.order_number != order_number);
        Ok(())
    }

    async fn insert_claim(&self, claim: NewClaim) -> Result<Claim> {
        let mut state = self.state.write().await;
        state.next_claim_id += 1;
        let stored = Claim {
            id: ClaimId::new(state.next_claim_id),
            order_item_id: claim.order_item_id,
            user_id: claim.user_id,
            claim_type: claim.claim_type,
            reason: claim.reason,
            status: ClaimStatus::Requested,
            claimed_at: claim.claimed_at,
            processed_at: None,
            processed_by: None,
            memo: None,
        };
        state.claims.push(stored.clone());
        Ok(stored)
    }

    async fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>> {
        let state = self.state.read().await;
        Ok(state.claims.iter().find(|c| c.id == id).cloned())
    }

    async fn claims_for_item(
        &self,
        order_item_id: OrderItemId,
        claim_type: Option<ClaimType>,
    ) -> Result<Vec<Claim>> {
        let state = self.state.read().await;
        Ok(state
            .claims
            .iter()
            .filter(|c| c.order_item_id == order_item_id)
            .filter(|c| claim_type.is_none_or(|t| c.claim_type == t))
            .cloned()
            .collect())
    }

    async fn apply_claim_decision(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        update: ClaimDecisionUpdate,
    ) -> Result<Claim> {
        let mut state = self.state.write().await;
        let claim = state
            .claims
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EntityStoreError::ClaimNotFound(id))?;

        if claim.status != expected {
            return Err(EntityStoreError::ClaimStatusConflict {
                claim_id: id,
                expected,
                actual: claim.status,
            });
        }

        claim.status = update.status;
        claim.processed_at = Some(update.processed_at);
        claim.processed_by = update.processed_by;
        claim.memo = update.memo;
        Ok(claim.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::AddressId;
    use domain::Money;

    fn order(number: &str, user: i64, payment: i64) -> Order {
        Order {
            order_number: OrderNumber::new(number),
            user_id: UserId::new(user),
            payment_id: PaymentId::new(payment),
            address_id: AddressId::new(1),
            ordered_at: Utc::now(),
            total_amount: Money::from_units(1000),
        }
    }

    fn new_item(number: &str, product: i64, seller: i64) -> NewOrderItem {
        NewOrderItem::paid(
            OrderNumber::new(number),
            ProductId::new(product),
            UserId::new(seller),
            1,
            Money::from_units(1000),
            Money::zero(),
            Money::zero(),
        )
    }

    #[tokio::test]
    async fn insert_and_get_order() {
        let store = InMemoryEntityStore::new();
        store.insert_order(order("A", 1, 10)).await.unwrap();

        let loaded = store.get_order(&OrderNumber::new("A")).await.unwrap();
        assert_eq!(loaded.unwrap().payment_id, PaymentId::new(10));
        assert!(
            store
                .get_order(&OrderNumber::new("missing"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_payment_ref_rejected() {
        let store = InMemoryEntityStore::new();
        store.insert_order(order("A", 1, 10)).await.unwrap();

        let err = store.insert_order(order("B", 2, 10)).await.unwrap_err();
        assert!(matches!(err, EntityStoreError::DuplicatePaymentRef(p) if p == PaymentId::new(10)));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_order_number_rejected() {
        let store = InMemoryEntityStore::new();
        store.insert_order(order("A", 1, 10)).await.unwrap();

        let err = store.insert_order(order("A", 2, 11)).await.unwrap_err();
        assert!(matches!(err, EntityStoreError::DuplicateOrderNumber(_)));
    }

    #[tokio::test]
    async fn payment_ref_probe() {
        let store = InMemoryEntityStore::new();
        assert!(!store.payment_ref_exists(PaymentId::new(10)).await.unwrap());
        store.insert_order(order("A", 1, 10)).await.unwrap();
        assert!(store.payment_ref_exists(PaymentId::new(10)).await.unwrap());
    }

    #[tokio::test]
    async fn item_ids_are_assigned_sequentially() {
        let store = InMemoryEntityStore::new();
        let first = store.insert_order_item(new_item("A", 1, 5)).await.unwrap();
        let second = store.insert_order_item(new_item("A", 2, 5)).await.unwrap();
        assert_eq!(first.id, OrderItemId::new(1));
        assert_eq!(second.id, OrderItemId::new(2));
    }

    #[tokio::test]
    async fn items_listed_in_insertion_order() {
        let store = InMemoryEntityStore::new();
        for product in [3, 1, 2] {
            store
                .insert_order_item(new_item("A", product, 5))
                .await
                .unwrap();
        }

        let items = store.items_for_order(&OrderNumber::new("A")).await.unwrap();
        let products: Vec<i64> = items.iter().map(|i| i.product_id.value()).collect();
        assert_eq!(products, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn seller_and_product_lookups() {
        let store = InMemoryEntityStore::new();
        store.insert_order_item(new_item("A", 1, 5)).await.unwrap();
        store.insert_order_item(new_item("B", 1, 6)).await.unwrap();
        store.insert_order_item(new_item("C", 2, 5)).await.unwrap();

        assert_eq!(store.items_for_seller(UserId::new(5)).await.unwrap().len(), 2);
        assert_eq!(
            store
                .items_for_product(ProductId::new(1))
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn status_cas_succeeds_when_expected_matches() {
        let store = InMemoryEntityStore::new();
        let item = store.insert_order_item(new_item("A", 1, 5)).await.unwrap();

        let updated = store
            .update_item_status(
                item.id,
                OrderItemStatus::Paid,
                OrderItemStatus::ReadyShipment,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderItemStatus::ReadyShipment);
    }

    #[tokio::test]
    async fn status_cas_fails_on_stale_expectation() {
        let store = InMemoryEntityStore::new();
        let item = store.insert_order_item(new_item("A", 1, 5)).await.unwrap();
        store
            .update_item_status(item.id, OrderItemStatus::Paid, OrderItemStatus::Cancelled)
            .await
            .unwrap();

        let err = store
            .update_item_status(
                item.id,
                OrderItemStatus::Paid,
                OrderItemStatus::ReadyShipment,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EntityStoreError::ItemStatusConflict {
                actual: OrderItemStatus::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn status_cas_on_missing_item() {
        let store = InMemoryEntityStore::new();
        let err = store
            .update_item_status(
                OrderItemId::new(99),
                OrderItemStatus::Paid,
                OrderItemStatus::ReadyShipment,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EntityStoreError::OrderItemNotFound(_)));
    }

    #[tokio::test]
    async fn claims_born_requested_and_filterable_by_type() {
        let store = InMemoryEntityStore::new();
        let item = store.insert_order_item(new_item("A", 1, 5)).await.unwrap();

        let refund = NewClaim {
            order_item_id: item.id,
            user_id: UserId::new(1),
            claim_type: ClaimType::Refund,
            reason: "damaged".to_string(),
            claimed_at: Utc::now(),
        };
        let exchange = NewClaim {
            claim_type: ClaimType::Exchange,
            ..refund.clone()
        };
        let claim = store.insert_claim(refund).await.unwrap();
        store.insert_claim(exchange).await.unwrap();

        assert_eq!(claim.status, ClaimStatus::Requested);
        assert!(claim.processed_at.is_none());

        let refunds = store
            .claims_for_item(item.id, Some(ClaimType::Refund))
            .await
            .unwrap();
        assert_eq!(refunds.len(), 1);
        let all = store.claims_for_item(item.id, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_claims_for_same_item_and_type_are_tolerated() {
        let store = InMemoryEntityStore::new();
        let item = store.insert_order_item(new_item("A", 1, 5)).await.unwrap();

        for _ in 0..2 {
            store
                .insert_claim(NewClaim {
                    order_item_id: item.id,
                    user_id: UserId::new(1),
                    claim_type: ClaimType::Refund,
                    reason: "dup".to_string(),
                    claimed_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let rows = store
            .claims_for_item(item.id, Some(ClaimType::Refund))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn claim_decision_cas() {
        let store = InMemoryEntityStore::new();
        let item = store.insert_order_item(new_item("A", 1, 5)).await.unwrap();
        let claim = store
            .insert_claim(NewClaim {
                order_item_id: item.id,
                user_id: UserId::new(1),
                claim_type: ClaimType::Refund,
                reason: "damaged".to_string(),
                claimed_at: Utc::now(),
            })
            .await
            .unwrap();

        let decided = store
            .apply_claim_decision(
                claim.id,
                ClaimStatus::Requested,
                ClaimDecisionUpdate {
                    status: ClaimStatus::Rejected,
                    processed_at: Utc::now(),
                    processed_by: Some("seller-5".to_string()),
                    memo: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(decided.status, ClaimStatus::Rejected);
        assert!(decided.processed_at.is_some());

        // A second decision loses the CAS.
        let err = store
            .apply_claim_decision(
                claim.id,
                ClaimStatus::Requested,
                ClaimDecisionUpdate {
                    status: ClaimStatus::Approved,
                    processed_at: Utc::now(),
                    processed_by: None,
                    memo: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EntityStoreError::ClaimStatusConflict { .. }));
    }

    #[tokio::test]
    async fn rollback_deletes() {
        let store = InMemoryEntityStore::new();
        store.insert_order(order("A", 1, 10)).await.unwrap();
        store.insert_order_item(new_item("A", 1, 5)).await.unwrap();
        store.insert_order_item(new_item("A", 2, 5)).await.unwrap();

        store
            .delete_items_for_order(&OrderNumber::new("A"))
            .await
            .unwrap();
        store.delete_order(&OrderNumber::new("A")).await.unwrap();

        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.item_count().await, 0);
    }

    #[tokio::test]
    async fn concurrent_inserts_with_same_payment_ref() {
        let store = InMemoryEntityStore::new();
        let a = store.clone();
        let b = store.clone();

        let (ra, rb) = tokio::join!(
            a.insert_order(order("A", 1, 10)),
            b.insert_order(order("B", 2, 10)),
        );

        assert!(ra.is_ok() != rb.is_ok(), "exactly one insert must win");
        assert_eq!(store.order_count().await, 1);
    }
}
