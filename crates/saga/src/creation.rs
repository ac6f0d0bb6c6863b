//! The order creation saga.
//!
//! A two-phase best-effort saga: local writes first, then the synchronous
//! payment notification. On failure after the duplicate-payment guard the
//! saga rolls back its own local rows and runs best-effort compensation
//! against the delivery and payment services, then surfaces the original
//! failure wrapped in [`OrderError::OrderCreationFailed`].

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use common::{AddressId, OrderNumber, PaymentId, ProductId, UserId};
use domain::{Money, NewOrderItem, Order};
use entity_store::{EntityStore, EntityStoreError};
use gateway::{DeliveryGateway, PaymentGateway};

use crate::error::{OrderError, Result};

const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// One candidate line of a creation request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub quantity: u32,
    pub unit_price: Money,
    /// Zero means no discount.
    pub discount_price: Money,
    pub shipping_fee: Money,
}

/// A request to create an order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub payment_id: PaymentId,
    pub address_id: AddressId,
    pub items: Vec<OrderLine>,
}

/// Orchestrates order creation against the store and the payment/delivery
/// services.
pub struct CreationSaga<S, P, D>
where
    S: EntityStore,
    P: PaymentGateway,
    D: DeliveryGateway,
{
    store: S,
    payment: P,
    delivery: D,
}

impl<S, P, D> CreationSaga<S, P, D>
where
    S: EntityStore,
    P: PaymentGateway,
    D: DeliveryGateway,
{
    /// Creates a new creation saga over injected clients.
    pub fn new(store: S, payment: P, delivery: D) -> Self {
        Self {
            store,
            payment,
            delivery,
        }
    }

    /// Runs the saga and returns the generated order number.
    ///
    /// Fails with [`OrderError::DuplicatePayment`] if an order already exists
    /// for the request's payment reference — that precondition failure runs
    /// no compensation. Every later failure is compensated and wrapped in
    /// [`OrderError::OrderCreationFailed`].
    #[tracing::instrument(skip(self, request), fields(payment_id = %request.payment_id))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderNumber> {
        metrics::counter!("order_creation_total").increment(1);
        let started = std::time::Instant::now();

        if self.store.payment_ref_exists(request.payment_id).await? {
            metrics::counter!("order_creation_duplicate_total").increment(1);
            return Err(OrderError::DuplicatePayment(request.payment_id));
        }

        let run_id = Uuid::new_v4();
        let mut persisted: Option<OrderNumber> = None;

        match self.run(&request, &mut persisted).await {
            Ok(order_number) => {
                metrics::histogram!("order_creation_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(%run_id, %order_number, "order created");
                Ok(order_number)
            }
            Err(cause) => {
                tracing::warn!(%run_id, error = %cause, "order creation failed, compensating");
                if let Some(order_number) = persisted {
                    self.rollback_local(&order_number).await;
                }
                self.compensate(request.address_id, request.payment_id).await;
                metrics::counter!("order_creation_failed_total").increment(1);
                Err(OrderError::OrderCreationFailed(Box::new(cause)))
            }
        }
    }

    async fn run(
        &self,
        request: &CreateOrderRequest,
        persisted: &mut Option<OrderNumber>,
    ) -> Result<OrderNumber> {
        let order_number = self.allocate_order_number().await?;

        let lines: Vec<NewOrderItem> = request
            .items
            .iter()
            .map(|line| {
                NewOrderItem::paid(
                    order_number.clone(),
                    line.product_id,
                    line.seller_id,
                    line.quantity,
                    line.unit_price,
                    line.discount_price,
                    line.shipping_fee,
                )
            })
            .collect();
        let total_amount: Money = lines.iter().map(|l| l.total_amount).sum();

        let order = Order {
            order_number: order_number.clone(),
            user_id: request.user_id,
            payment_id: request.payment_id,
            address_id: request.address_id,
            ordered_at: Utc::now(),
            total_amount,
        };
        self.store.insert_order(order).await.map_err(|e| match e {
            e @ (EntityStoreError::DuplicatePaymentRef(_)
            | EntityStoreError::DuplicateOrderNumber(_)) => OrderError::OrderPersistFailure(e),
            other => OrderError::Store(other),
        })?;
        *persisted = Some(order_number.clone());

        for line in lines {
            self.store.insert_order_item(line).await?;
        }

        // Hard dependency: an order the payment service does not know about
        // is not fulfillable.
        self.payment
            .assign_order_number(request.payment_id, &order_number)
            .await?;

        Ok(order_number)
    }

    /// Picks an order number the store has not seen yet. The insert still
    /// guards against the remaining race with its uniqueness check.
    async fn allocate_order_number(&self) -> Result<OrderNumber> {
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = generate_order_number();
            if self.store.get_order(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(OrderError::OrderNumberExhausted(ORDER_NUMBER_ATTEMPTS))
    }

    /// Removes the rows written by this saga run. Failures are logged and
    /// swallowed; the caller surfaces the original failure regardless.
    async fn rollback_local(&self, order_number: &OrderNumber) {
        if let Err(e) = self.store.delete_items_for_order(order_number).await {
            tracing::warn!(%order_number, error = %e, "rollback: could not delete order items");
        }
        if let Err(e) = self.store.delete_order(order_number).await {
            tracing::warn!(%order_number, error = %e, "rollback: could not delete order");
        }
    }

    /// Best-effort external compensation: delete the address record, then the
    /// payment record. The calls run sequentially and are independently
    /// fault-isolated; failures are logged, never re-thrown.
    async fn compensate(&self, address_id: AddressId, payment_id: PaymentId) {
        if let Err(e) = self.delivery.delete_address(address_id).await {
            metrics::counter!("compensation_failures_total").increment(1);
            tracing::warn!(%address_id, error = %e, "compensation: address delete failed");
        }
        if let Err(e) = self.payment.delete_payment(payment_id).await {
            metrics::counter!("compensation_failures_total").increment(1);
            tracing::warn!(%payment_id, error = %e, "compensation: payment delete failed");
        }
    }
}

/// Generates a candidate order number: the current UTC date and a 4-digit
/// random suffix.
fn generate_order_number() -> OrderNumber {
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
    OrderNumber::new(format!("{date}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::OrderItemStatus;
    use entity_store::InMemoryEntityStore;
    use gateway::{InMemoryDeliveryGateway, InMemoryPaymentGateway};

    fn saga() -> (
        CreationSaga<InMemoryEntityStore, InMemoryPaymentGateway, InMemoryDeliveryGateway>,
        InMemoryEntityStore,
        InMemoryPaymentGateway,
        InMemoryDeliveryGateway,
    ) {
        let store = InMemoryEntityStore::new();
        let payment = InMemoryPaymentGateway::new();
        let delivery = InMemoryDeliveryGateway::new();
        let saga = CreationSaga::new(store.clone(), payment.clone(), delivery.clone());
        (saga, store, payment, delivery)
    }

    fn request(payment: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: UserId::new(1),
            payment_id: PaymentId::new(payment),
            address_id: AddressId::new(5),
            items: vec![
                OrderLine {
                    product_id: ProductId::new(11),
                    seller_id: UserId::new(2),
                    quantity: 2,
                    unit_price: Money::from_units(10_000),
                    discount_price: Money::from_units(8_000),
                    shipping_fee: Money::from_units(2_500),
                },
                OrderLine {
                    product_id: ProductId::new(12),
                    seller_id: UserId::new(3),
                    quantity: 1,
                    unit_price: Money::from_units(5_000),
                    discount_price: Money::zero(),
                    shipping_fee: Money::zero(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn happy_path_persists_order_and_notifies_payment() {
        let (saga, store, payment, _) = saga();

        let order_number = saga.create_order(request(10)).await.unwrap();

        let order = store.get_order(&order_number).await.unwrap().unwrap();
        // 8000*2+2500 + 5000*1+0
        assert_eq!(order.total_amount, Money::from_units(23_500));

        let items = store.items_for_order(&order_number).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.status == OrderItemStatus::Paid));
        let item_total: Money = items.iter().map(|i| i.total_amount).sum();
        assert_eq!(item_total, order.total_amount);

        assert_eq!(
            payment.assigned_order_number(PaymentId::new(10)),
            Some(order_number)
        );
    }

    #[tokio::test]
    async fn order_number_has_date_prefix_and_random_suffix() {
        let (saga, _, _, _) = saga();
        let order_number = saga.create_order(request(10)).await.unwrap();

        let s = order_number.as_str();
        assert_eq!(s.len(), 12);
        assert!(s.chars().all(|c| c.is_ascii_digit()));
        let suffix: u32 = s[8..].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }

    #[tokio::test]
    async fn duplicate_payment_is_rejected_without_compensation() {
        let (saga, store, payment, delivery) = saga();
        saga.create_order(request(10)).await.unwrap();

        let err = saga.create_order(request(10)).await.unwrap_err();
        assert!(matches!(err, OrderError::DuplicatePayment(p) if p == PaymentId::new(10)));

        // Exactly one order row remains, and nothing was compensated.
        assert_eq!(store.order_count().await, 1);
        assert!(delivery.deleted_addresses().is_empty());
        assert!(payment.deleted_payments().is_empty());
    }

    #[tokio::test]
    async fn notification_failure_rolls_back_and_compensates() {
        let (saga, store, payment, delivery) = saga();
        payment.set_fail_on_assign(true);

        let err = saga.create_order(request(10)).await.unwrap_err();
        let OrderError::OrderCreationFailed(cause) = err else {
            panic!("expected OrderCreationFailed, got {err}");
        };
        assert!(matches!(*cause, OrderError::ExternalDependency { .. }));

        // Local rows were rolled back, both compensations ran.
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.item_count().await, 0);
        assert_eq!(delivery.deleted_addresses(), vec![AddressId::new(5)]);
        assert_eq!(payment.deleted_payments(), vec![PaymentId::new(10)]);
    }

    #[tokio::test]
    async fn compensation_steps_are_fault_isolated() {
        let (saga, _, payment, delivery) = saga();
        payment.set_fail_on_assign(true);
        delivery.set_fail_on_delete_address(true);

        let err = saga.create_order(request(10)).await.unwrap_err();
        assert!(matches!(err, OrderError::OrderCreationFailed(_)));

        // The failing address delete did not stop the payment delete.
        assert!(delivery.deleted_addresses().is_empty());
        assert_eq!(payment.deleted_payments(), vec![PaymentId::new(10)]);
    }

    #[tokio::test]
    async fn retry_after_failed_notification_succeeds() {
        let (saga, store, payment, _) = saga();
        payment.set_fail_on_assign(true);
        saga.create_order(request(10)).await.unwrap_err();

        // The rollback freed the payment reference for a retry.
        payment.set_fail_on_assign(false);
        let order_number = saga.create_order(request(10)).await.unwrap();
        assert_eq!(store.order_count().await, 1);
        assert!(store.get_order(&order_number).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn line_totals_follow_discount_preference() {
        let (saga, store, _, _) = saga();
        let order_number = saga.create_order(request(10)).await.unwrap();

        let items = store.items_for_order(&order_number).await.unwrap();
        // Discounted line: 8000 * 2 + 2500.
        assert_eq!(items[0].total_amount, Money::from_units(18_500));
        // Undiscounted line: 5000 * 1.
        assert_eq!(items[1].total_amount, Money::from_units(5_000));
    }
}
