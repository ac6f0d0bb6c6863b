//! Seller-facing views: the sales list and the processing queue.

use futures_util::future::join_all;

use common::UserId;
use domain::OrderItem;
use entity_store::EntityStore;
use gateway::fallback::{card_type_or_unknown, product_or_placeholder, CARD_TYPE_UNKNOWN};
use gateway::{PaymentGateway, ProductGateway};

use crate::error::Result;
use crate::item::EnrichedOrderItem;

/// Assembles the seller's item lists from the store and the gateways.
pub struct SellerOrdersView<S, P, Pay>
where
    S: EntityStore,
    P: ProductGateway,
    Pay: PaymentGateway,
{
    store: S,
    product: P,
    payment: Pay,
}

impl<S, P, Pay> SellerOrdersView<S, P, Pay>
where
    S: EntityStore,
    P: ProductGateway,
    Pay: PaymentGateway,
{
    /// Creates a new seller view over injected clients.
    pub fn new(store: S, product: P, payment: Pay) -> Self {
        Self {
            store,
            product,
            payment,
        }
    }

    /// Every item sold by the seller, card-type enriched, no status filter.
    #[tracing::instrument(skip(self))]
    pub async fn sales(&self, seller_id: UserId) -> Result<Vec<EnrichedOrderItem>> {
        let items = self.store.items_for_seller(seller_id).await?;
        Ok(self.enrich_all(&items).await)
    }

    /// The seller's processing queue: fulfillment-path items only, with
    /// completed items (`DELIVERED`/`PURCHASE_CONFIRMED`) moved to the back.
    /// Encounter order is preserved inside each partition.
    #[tracing::instrument(skip(self))]
    pub async fn processing_queue(&self, seller_id: UserId) -> Result<Vec<EnrichedOrderItem>> {
        let items: Vec<OrderItem> = self
            .store
            .items_for_seller(seller_id)
            .await?
            .into_iter()
            .filter(|i| i.status.is_fulfillment())
            .collect();

        let enriched = self.enrich_all(&items).await;
        let (mut in_progress, completed): (Vec<_>, Vec<_>) = enriched
            .into_iter()
            .partition(|i| !i.status.is_completed());
        in_progress.extend(completed);
        Ok(in_progress)
    }

    /// Enriches items concurrently, preserving the input order.
    async fn enrich_all(&self, items: &[OrderItem]) -> Vec<EnrichedOrderItem> {
        join_all(items.iter().map(|item| self.enrich(item))).await
    }

    async fn enrich(&self, item: &OrderItem) -> EnrichedOrderItem {
        let product = product_or_placeholder(self.product.fetch_product(item.product_id).await);

        // The card type hangs off the parent order's payment reference.
        let card_type = match self.store.get_order(&item.order_number).await {
            Ok(Some(order)) => {
                card_type_or_unknown(self.payment.fetch_card_type(order.payment_id).await)
            }
            _ => CARD_TYPE_UNKNOWN.to_string(),
        };

        let mut enriched = EnrichedOrderItem::base(item, product);
        enriched.card_type = Some(card_type);
        enriched
    }
}
