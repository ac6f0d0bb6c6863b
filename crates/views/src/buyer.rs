//! Buyer-facing order views: history, claims, and confirmed items.

use futures_util::future::join_all;

use common::UserId;
use domain::{OrderItem, OrderItemStatus};
use entity_store::EntityStore;
use gateway::fallback::{card_type_or_unknown, company_name_or_placeholder,
    display_name_or_placeholder, product_or_placeholder};
use gateway::{PaymentGateway, ProductGateway, UserGateway};

use crate::error::Result;
use crate::filter::OrderHistoryFilter;
use crate::item::{EnrichedOrderItem, OrderView};

/// Assembles the buyer's order lists from the store and the gateways.
pub struct BuyerOrdersView<S, P, U, Pay>
where
    S: EntityStore,
    P: ProductGateway,
    U: UserGateway,
    Pay: PaymentGateway,
{
    store: S,
    product: P,
    user: U,
    payment: Pay,
}

impl<S, P, U, Pay> BuyerOrdersView<S, P, U, Pay>
where
    S: EntityStore,
    P: ProductGateway,
    U: UserGateway,
    Pay: PaymentGateway,
{
    /// Creates a new buyer view over injected clients.
    pub fn new(store: S, product: P, user: U, payment: Pay) -> Self {
        Self {
            store,
            product,
            user,
            payment,
        }
    }

    /// The buyer's order history: items on the fulfillment path, optionally
    /// narrowed by date range, exact status, and keyword. Orders whose item
    /// set ends up empty are dropped.
    #[tracing::instrument(skip(self, filter))]
    pub async fn orders(
        &self,
        user_id: UserId,
        filter: &OrderHistoryFilter,
    ) -> Result<Vec<OrderView>> {
        self.assemble(user_id, filter, OrderItemStatus::is_fulfillment)
            .await
    }

    /// The buyer's claims view: same shape, restricted to the dispute
    /// statuses.
    #[tracing::instrument(skip(self, filter))]
    pub async fn claims(
        &self,
        user_id: UserId,
        filter: &OrderHistoryFilter,
    ) -> Result<Vec<OrderView>> {
        self.assemble(user_id, filter, OrderItemStatus::is_dispute)
            .await
    }

    /// The buyer's purchase-confirmed items, enriched with the product,
    /// company name, and order date (feeds the review flow).
    #[tracing::instrument(skip(self))]
    pub async fn confirmed_items(&self, user_id: UserId) -> Result<Vec<EnrichedOrderItem>> {
        let orders = self.store.orders_for_user(user_id).await?;

        let mut result = Vec::new();
        for order in orders {
            let items = self.store.items_for_order(&order.order_number).await?;
            let confirmed: Vec<&OrderItem> = items
                .iter()
                .filter(|i| i.status == OrderItemStatus::PurchaseConfirmed)
                .collect();

            let ordered_at = order.ordered_at;
            let enriched = join_all(confirmed.into_iter().map(|item| async move {
                let mut enriched = self.enrich(item).await;
                enriched.ordered_at = Some(ordered_at);
                enriched
            }))
            .await;
            result.extend(enriched);
        }
        Ok(result)
    }

    async fn assemble(
        &self,
        user_id: UserId,
        filter: &OrderHistoryFilter,
        bucket: impl Fn(&OrderItemStatus) -> bool,
    ) -> Result<Vec<OrderView>> {
        let started = std::time::Instant::now();

        let mut orders = self.store.orders_for_user(user_id).await?;
        if let Some(range) = &filter.date_range {
            orders.retain(|o| range.contains(o.ordered_date()));
        }

        let buyer_name =
            display_name_or_placeholder(self.user.fetch_display_name(user_id).await);

        let mut result = Vec::new();
        for order in orders {
            let items = self.store.items_for_order(&order.order_number).await?;
            let card_type =
                card_type_or_unknown(self.payment.fetch_card_type(order.payment_id).await);

            let mut enriched: Vec<EnrichedOrderItem> =
                join_all(items.iter().filter(|i| bucket(&i.status)).map(|item| {
                    let buyer_name = buyer_name.clone();
                    let card_type = card_type.clone();
                    async move {
                        let mut enriched = self.enrich(item).await;
                        enriched.seller_name = Some(display_name_or_placeholder(
                            self.user.fetch_display_name(item.seller_id).await,
                        ));
                        enriched.buyer_name = Some(buyer_name);
                        enriched.card_type = Some(card_type);
                        enriched
                    }
                }))
                .await;

            if let Some(status) = filter.status {
                enriched.retain(|i| i.status == status);
            }
            if let Some(keyword) = &filter.keyword {
                enriched.retain(|i| i.matches_keyword(keyword));
            }
            if enriched.is_empty() {
                continue;
            }

            result.push(OrderView::assemble(&order, enriched));
        }

        metrics::histogram!("view_assembly_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        Ok(result)
    }

    /// Product and company-name enrichment shared by every buyer view.
    async fn enrich(&self, item: &OrderItem) -> EnrichedOrderItem {
        let product = product_or_placeholder(self.product.fetch_product(item.product_id).await);
        let company =
            company_name_or_placeholder(self.user.fetch_company_name(item.seller_id).await);

        let mut enriched = EnrichedOrderItem::base(item, product);
        enriched.company_name = Some(company);
        enriched
    }
}
