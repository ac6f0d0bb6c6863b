//! The buyer's order detail view.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use common::{AddressId, OrderNumber, PaymentId};
use domain::{Money, OrderItem, OrderItemStatus};
use entity_store::EntityStore;
use gateway::fallback::{address_or_placeholder, card_type_or_unknown,
    company_name_or_placeholder, product_or_placeholder};
use gateway::{Address, DeliveryGateway, PaymentGateway, ProductGateway, UserGateway};

use crate::error::{Result, ViewError};
use crate::item::EnrichedOrderItem;

/// The full order detail: header, items, address, card type, and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_number: OrderNumber,
    pub payment_id: PaymentId,
    pub address_id: AddressId,
    pub ordered_at: DateTime<Utc>,
    pub total_amount: Money,

    pub items: Vec<EnrichedOrderItem>,
    pub address: Address,
    pub card_type: String,

    /// Σ applied unit price × quantity over every item.
    pub items_total: Money,
    /// Σ shipping fee over every item.
    pub shipping_total: Money,
    /// Goods total over `CANCELLED` / `REFUND_APPROVED` items.
    pub cancel_items_total: Money,
    /// Shipping total over `CANCELLED` / `REFUND_APPROVED` items.
    pub cancel_shipping_total: Money,
    /// `cancel_items_total + cancel_shipping_total`.
    pub cancel_total_amount: Money,
}

/// Assembles the order detail from the store and all four gateways.
pub struct OrderDetailView<S, D, P, U, Pay>
where
    S: EntityStore,
    D: DeliveryGateway,
    P: ProductGateway,
    U: UserGateway,
    Pay: PaymentGateway,
{
    store: S,
    delivery: D,
    product: P,
    user: U,
    payment: Pay,
}

impl<S, D, P, U, Pay> OrderDetailView<S, D, P, U, Pay>
where
    S: EntityStore,
    D: DeliveryGateway,
    P: ProductGateway,
    U: UserGateway,
    Pay: PaymentGateway,
{
    /// Creates a new detail view over injected clients.
    pub fn new(store: S, delivery: D, product: P, user: U, payment: Pay) -> Self {
        Self {
            store,
            delivery,
            product,
            user,
            payment,
        }
    }

    /// Builds the detail view for one order. Items are included regardless of
    /// status; every external lookup degrades independently.
    #[tracing::instrument(skip(self))]
    pub async fn order_detail(&self, order_number: &OrderNumber) -> Result<OrderDetail> {
        let started = std::time::Instant::now();

        let order = self
            .store
            .get_order(order_number)
            .await?
            .ok_or_else(|| ViewError::OrderNotFound(order_number.clone()))?;
        let items = self.store.items_for_order(order_number).await?;

        let (address, card_type) = tokio::join!(
            self.delivery.fetch_address(order.address_id),
            self.payment.fetch_card_type(order.payment_id),
        );
        let address = address_or_placeholder(address);
        let card_type = card_type_or_unknown(card_type);

        let enriched: Vec<EnrichedOrderItem> =
            join_all(items.iter().map(|item| self.enrich(item))).await;

        let items_total: Money = enriched.iter().map(|i| i.goods_total()).sum();
        let shipping_total: Money = enriched.iter().map(|i| i.shipping_fee).sum();

        let cancelled: Vec<&EnrichedOrderItem> = enriched
            .iter()
            .filter(|i| {
                matches!(
                    i.status,
                    OrderItemStatus::Cancelled | OrderItemStatus::RefundApproved
                )
            })
            .collect();
        let cancel_items_total: Money = cancelled.iter().map(|i| i.goods_total()).sum();
        let cancel_shipping_total: Money = cancelled.iter().map(|i| i.shipping_fee).sum();

        metrics::histogram!("view_assembly_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(OrderDetail {
            order_number: order.order_number,
            payment_id: order.payment_id,
            address_id: order.address_id,
            ordered_at: order.ordered_at,
            total_amount: order.total_amount,
            items: enriched,
            address,
            card_type,
            items_total,
            shipping_total,
            cancel_items_total,
            cancel_shipping_total,
            cancel_total_amount: cancel_items_total + cancel_shipping_total,
        })
    }

    async fn enrich(&self, item: &OrderItem) -> EnrichedOrderItem {
        let product = product_or_placeholder(self.product.fetch_product(item.product_id).await);
        let company =
            company_name_or_placeholder(self.user.fetch_company_name(item.seller_id).await);

        let mut enriched = EnrichedOrderItem::base(item, product);
        enriched.company_name = Some(company);
        enriched
    }
}
