//! Seller-side fulfillment and buyer purchase confirmation.

use chrono::{Duration, Utc};

use common::OrderItemId;
use domain::{CancelReason, OrderItem, OrderItemStatus, Trigger, transition};
use entity_store::EntityStore;
use gateway::{DeliveryGateway, DeliveryRequest, DeliveryStatus, ProductGateway};

use crate::error::{OrderError, Result};

const ESTIMATED_DELIVERY_DAYS: i64 = 7;

/// Drives order items along the fulfillment path and keeps the delivery
/// service in step.
pub struct FulfillmentService<S, D, P>
where
    S: EntityStore,
    D: DeliveryGateway,
    P: ProductGateway,
{
    store: S,
    delivery: D,
    product: P,
}

impl<S, D, P> FulfillmentService<S, D, P>
where
    S: EntityStore,
    D: DeliveryGateway,
    P: ProductGateway,
{
    /// Creates a new fulfillment service over injected clients.
    pub fn new(store: S, delivery: D, product: P) -> Self {
        Self {
            store,
            delivery,
            product,
        }
    }

    /// Advances an item one step along the fulfillment path.
    ///
    /// The delivery-service side effect depends on the step: entering
    /// `READY_SHIPMENT` creates the delivery record, entering `SHIPPED` or
    /// `DELIVERED` advances it. Delivery failures propagate — a missing side
    /// effect means the item is not actually moving.
    #[tracing::instrument(skip(self))]
    pub async fn advance(&self, order_item_id: OrderItemId) -> Result<OrderItem> {
        let item = self
            .store
            .get_order_item(order_item_id)
            .await?
            .ok_or(OrderError::OrderItemNotFound(order_item_id))?;

        let next = transition::next_status(item.status, Trigger::Advance)?;
        match next {
            OrderItemStatus::ReadyShipment => self.open_delivery(&item).await?,
            OrderItemStatus::Shipped => {
                self.progress_delivery(item.id, DeliveryStatus::InTransit)
                    .await?
            }
            OrderItemStatus::Delivered => {
                self.progress_delivery(item.id, DeliveryStatus::Delivered)
                    .await?
            }
            // Purchase confirmation has no delivery-side counterpart.
            _ => {}
        }

        let updated = self.store.update_item_status(item.id, item.status, next).await?;
        metrics::counter!("fulfillment_advanced_total").increment(1);
        tracing::info!(%order_item_id, from = %item.status, to = %next, "item advanced");
        Ok(updated)
    }

    /// Cancels an item outside the claim flow (stock-out or undeliverable).
    #[tracing::instrument(skip(self))]
    pub async fn cancel(
        &self,
        order_item_id: OrderItemId,
        reason: CancelReason,
    ) -> Result<OrderItem> {
        let item = self
            .store
            .get_order_item(order_item_id)
            .await?
            .ok_or(OrderError::OrderItemNotFound(order_item_id))?;

        let next = transition::next_status(item.status, Trigger::SellerCancel(reason))?;
        let updated = self.store.update_item_status(item.id, item.status, next).await?;
        metrics::counter!("fulfillment_cancelled_total").increment(1);
        tracing::info!(%order_item_id, %reason, to = %next, "item cancelled by seller");
        Ok(updated)
    }

    /// Marks a delivered item as purchase-confirmed by the buyer.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_purchase(&self, order_item_id: OrderItemId) -> Result<OrderItem> {
        let item = self
            .store
            .get_order_item(order_item_id)
            .await?
            .ok_or(OrderError::OrderItemNotFound(order_item_id))?;

        let next = transition::next_status(item.status, Trigger::ConfirmPurchase)?;
        let updated = self.store.update_item_status(item.id, item.status, next).await?;
        tracing::info!(%order_item_id, "purchase confirmed");
        Ok(updated)
    }

    /// Creates the delivery record for an item entering shipment preparation.
    /// The tracking reference is the order number.
    async fn open_delivery(&self, item: &OrderItem) -> Result<()> {
        let order = self
            .store
            .get_order(&item.order_number)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(item.order_number.clone()))?;

        let recipient = self.delivery.fetch_address(order.address_id).await?;
        let product = self.product.fetch_product(item.product_id).await?;

        let request = DeliveryRequest {
            order_item_id: item.id,
            product_id: item.product_id,
            seller_address_id: product.seller_address_id,
            recipient,
            tracking_num: item.order_number.as_str().to_string(),
            courier_name: product.courier_name,
            estimated_delivery_date: Utc::now() + Duration::days(ESTIMATED_DELIVERY_DAYS),
            shipping_fee: item.shipping_fee,
        };
        self.delivery.create_delivery(request).await?;
        Ok(())
    }

    /// Moves the delivery record tracking an item to the given status.
    async fn progress_delivery(
        &self,
        order_item_id: OrderItemId,
        status: DeliveryStatus,
    ) -> Result<()> {
        let record = self
            .delivery
            .find_delivery_for_item(order_item_id)
            .await?
            .ok_or(OrderError::DeliveryNotFound(order_item_id))?;
        self.delivery
            .update_delivery_status(record.delivery_id, status)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{AddressId, OrderNumber, PaymentId, ProductId, UserId};
    use domain::{Money, NewOrderItem, Order};
    use entity_store::InMemoryEntityStore;
    use gateway::{Address, InMemoryDeliveryGateway, InMemoryProductGateway, Product};

    struct Fixture {
        service: FulfillmentService<InMemoryEntityStore, InMemoryDeliveryGateway,
            InMemoryProductGateway>,
        store: InMemoryEntityStore,
        delivery: InMemoryDeliveryGateway,
        item_id: OrderItemId,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryEntityStore::new();
        let delivery = InMemoryDeliveryGateway::new();
        let product = InMemoryProductGateway::new();

        store
            .insert_order(Order {
                order_number: OrderNumber::new("202406130001"),
                user_id: UserId::new(1),
                payment_id: PaymentId::new(10),
                address_id: AddressId::new(5),
                ordered_at: Utc::now(),
                total_amount: Money::from_units(10_000),
            })
            .await
            .unwrap();
        let item = store
            .insert_order_item(NewOrderItem::paid(
                OrderNumber::new("202406130001"),
                ProductId::new(11),
                UserId::new(2),
                1,
                Money::from_units(10_000),
                Money::zero(),
                Money::zero(),
            ))
            .await
            .unwrap();

        delivery.set_address(
            AddressId::new(5),
            Address {
                recipient_name: "Jane Doe".to_string(),
                recipient_tel: "010-0000-0000".to_string(),
                recipient_addr1: "1 Main St".to_string(),
                recipient_addr2: String::new(),
                recipient_zipcode: "00000".to_string(),
                recipient_req: String::new(),
            },
        );
        product.set_product(
            ProductId::new(11),
            Product {
                name: "Widget".to_string(),
                image: String::new(),
                seller_id: UserId::new(2),
                seller_address_id: AddressId::new(9),
                courier_name: "FastShip".to_string(),
            },
        );

        Fixture {
            service: FulfillmentService::new(store.clone(), delivery.clone(), product),
            store,
            delivery,
            item_id: item.id,
        }
    }

    #[tokio::test]
    async fn first_advance_creates_the_delivery_record() {
        let f = fixture().await;

        let item = f.service.advance(f.item_id).await.unwrap();
        assert_eq!(item.status, OrderItemStatus::ReadyShipment);
        assert_eq!(f.delivery.delivery_count(), 1);

        let record = f
            .delivery
            .find_delivery_for_item(f.item_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, DeliveryStatus::Ready);
    }

    #[tokio::test]
    async fn later_advances_progress_the_delivery_record() {
        let f = fixture().await;
        f.service.advance(f.item_id).await.unwrap(); // READY_SHIPMENT

        let item = f.service.advance(f.item_id).await.unwrap(); // SHIPPED
        assert_eq!(item.status, OrderItemStatus::Shipped);
        let record = f
            .delivery
            .find_delivery_for_item(f.item_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, DeliveryStatus::InTransit);

        let item = f.service.advance(f.item_id).await.unwrap(); // DELIVERED
        assert_eq!(item.status, OrderItemStatus::Delivered);
        let record = f
            .delivery
            .find_delivery_for_item(f.item_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn advance_past_confirmation_fails() {
        let f = fixture().await;
        for _ in 0..4 {
            f.service.advance(f.item_id).await.unwrap();
        }
        let item = f.store.get_order_item(f.item_id).await.unwrap().unwrap();
        assert_eq!(item.status, OrderItemStatus::PurchaseConfirmed);

        let err = f.service.advance(f.item_id).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn delivery_create_failure_leaves_status_untouched() {
        let f = fixture().await;
        f.delivery.set_fail_on_create(true);

        let err = f.service.advance(f.item_id).await.unwrap_err();
        assert!(matches!(err, OrderError::ExternalDependency { .. }));

        let item = f.store.get_order_item(f.item_id).await.unwrap().unwrap();
        assert_eq!(item.status, OrderItemStatus::Paid);
    }

    #[tokio::test]
    async fn seller_cancel_before_delivery() {
        let f = fixture().await;

        let item = f
            .service
            .cancel(f.item_id, CancelReason::StockOut)
            .await
            .unwrap();
        assert_eq!(item.status, OrderItemStatus::CancelledEmpty);

        // Destructive: no forward path remains.
        assert!(f.service.advance(f.item_id).await.is_err());
    }

    #[tokio::test]
    async fn confirm_purchase_requires_delivered() {
        let f = fixture().await;

        let err = f.service.confirm_purchase(f.item_id).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition(_)));

        for _ in 0..3 {
            f.service.advance(f.item_id).await.unwrap();
        }
        let item = f.service.confirm_purchase(f.item_id).await.unwrap();
        assert_eq!(item.status, OrderItemStatus::PurchaseConfirmed);
    }

    #[tokio::test]
    async fn missing_item_is_reported() {
        let f = fixture().await;
        let err = f.service.advance(OrderItemId::new(999)).await.unwrap_err();
        assert!(matches!(err, OrderError::OrderItemNotFound(_)));
    }
}
