//! The dispute pipeline: filing and deciding claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{ClaimId, OrderItemId, OrderNumber, UserId};
use domain::{Claim, ClaimDecision, ClaimStatus, ClaimType, Money, NewClaim, Trigger, transition};
use entity_store::{ClaimDecisionUpdate, EntityStore};

use crate::error::{OrderError, Result};

/// A seller-facing claim row joined with its order item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub claim_id: ClaimId,
    pub order_number: OrderNumber,
    pub claim_type: ClaimType,
    pub reason: String,
    pub status: ClaimStatus,
    pub claimed_at: DateTime<Utc>,
    /// The disputed line's total amount.
    pub amount: Money,
}

/// Requested/approved/rejected bucket counts over a claim listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimStatusCounts {
    pub requested: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ClaimStatusCounts {
    /// Claims still awaiting a decision.
    pub fn in_processing(&self) -> usize {
        self.requested
    }
}

/// Counts claims per decision bucket.
pub fn claim_status_counts(claims: &[ClaimSummary]) -> ClaimStatusCounts {
    let mut counts = ClaimStatusCounts::default();
    for claim in claims {
        match claim.status {
            ClaimStatus::Requested => counts.requested += 1,
            ClaimStatus::Approved => counts.approved += 1,
            ClaimStatus::Rejected => counts.rejected += 1,
        }
    }
    counts
}

/// Files and decides claims against order items.
pub struct ClaimService<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> ClaimService<S> {
    /// Creates a new claim service over the store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Files a buyer claim against an order item.
    ///
    /// Moves the item to the claim type's requested status and records one
    /// `REQUESTED` claim row carrying the buyer id from the parent order.
    #[tracing::instrument(skip(self, reason))]
    pub async fn file_claim(
        &self,
        order_item_id: OrderItemId,
        claim_type: ClaimType,
        reason: String,
    ) -> Result<Claim> {
        let item = self
            .store
            .get_order_item(order_item_id)
            .await?
            .ok_or(OrderError::OrderItemNotFound(order_item_id))?;
        let next = transition::next_status(item.status, Trigger::Dispute(claim_type))?;

        let order = self
            .store
            .get_order(&item.order_number)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(item.order_number.clone()))?;

        self.store
            .update_item_status(item.id, item.status, next)
            .await?;
        let claim = self
            .store
            .insert_claim(NewClaim {
                order_item_id: item.id,
                user_id: order.user_id,
                claim_type,
                reason,
                claimed_at: Utc::now(),
            })
            .await?;

        metrics::counter!("claims_filed_total").increment(1);
        tracing::info!(%order_item_id, claim_id = %claim.id, %claim_type, "claim filed");
        Ok(claim)
    }

    /// Applies the seller/administrator decision to a requested claim.
    ///
    /// The claim record is the authoritative outcome and is decided first;
    /// refund/exchange items then move through the engine's decision
    /// transition. A cancel claim's item is already `CANCELLED` and stays
    /// untouched.
    #[tracing::instrument(skip(self, processed_by, memo))]
    pub async fn decide_claim(
        &self,
        claim_id: ClaimId,
        decision: ClaimDecision,
        processed_by: Option<String>,
        memo: Option<String>,
    ) -> Result<Claim> {
        let claim = self
            .store
            .get_claim(claim_id)
            .await?
            .ok_or(OrderError::ClaimNotFound(claim_id))?;
        let next = transition::decide_claim(claim.status, decision)?;

        let decided = self
            .store
            .apply_claim_decision(
                claim.id,
                claim.status,
                ClaimDecisionUpdate {
                    status: next,
                    processed_at: Utc::now(),
                    processed_by,
                    memo,
                },
            )
            .await?;

        if claim.claim_type != ClaimType::Cancel {
            let item = self
                .store
                .get_order_item(claim.order_item_id)
                .await?
                .ok_or(OrderError::OrderItemNotFound(claim.order_item_id))?;
            let item_next =
                transition::next_status(item.status, Trigger::ClaimDecided(decision))?;
            self.store
                .update_item_status(item.id, item.status, item_next)
                .await?;
        }

        metrics::counter!("claims_decided_total").increment(1);
        tracing::info!(%claim_id, %decision, "claim decided");
        Ok(decided)
    }

    /// Lists the claims filed against a seller's items, optionally filtered
    /// by claim type. Duplicate claims on one item are returned as-is.
    #[tracing::instrument(skip(self))]
    pub async fn claims_for_seller(
        &self,
        seller_id: UserId,
        claim_type: Option<ClaimType>,
    ) -> Result<Vec<ClaimSummary>> {
        let items = self.store.items_for_seller(seller_id).await?;

        let mut summaries = Vec::new();
        for item in items {
            for claim in self.store.claims_for_item(item.id, claim_type).await? {
                summaries.push(ClaimSummary {
                    claim_id: claim.id,
                    order_number: item.order_number.clone(),
                    claim_type: claim.claim_type,
                    reason: claim.reason,
                    status: claim.status,
                    claimed_at: claim.claimed_at,
                    amount: item.total_amount,
                });
            }
        }
        Ok(summaries)
    }
}
