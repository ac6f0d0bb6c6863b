//! The status transition engine.
//!
//! Every status change in the system is computed here as a pure function of
//! `(current status, trigger)`. Callers persist the result through the entity
//! store's compare-and-set update; nothing else writes status values.

use crate::error::TransitionError;
use crate::status::{CancelReason, ClaimStatus, ClaimType, OrderItemStatus};

/// The seller/administrator decision on a requested claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    Approve,
    Reject,
}

impl std::fmt::Display for ClaimDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimDecision::Approve => write!(f, "approve"),
            ClaimDecision::Reject => write!(f, "reject"),
        }
    }
}

/// A trigger that may move an order item to a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Seller-side fulfillment step (prepare, ship, deliver, confirm).
    Advance,

    /// Buyer-side purchase confirmation of a delivered item.
    ConfirmPurchase,

    /// Buyer files a cancel/refund/exchange claim.
    Dispute(ClaimType),

    /// Seller cancels the item outside the claim flow.
    SellerCancel(CancelReason),

    /// A requested refund/exchange claim was decided.
    ClaimDecided(ClaimDecision),
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Advance => write!(f, "advance"),
            Trigger::ConfirmPurchase => write!(f, "confirm-purchase"),
            Trigger::Dispute(t) => write!(f, "dispute({t})"),
            Trigger::SellerCancel(r) => write!(f, "seller-cancel({r})"),
            Trigger::ClaimDecided(d) => write!(f, "claim-decided({d})"),
        }
    }
}

/// Computes the next status of an order item.
///
/// Total over the trigger set: every `(status, trigger)` pair either yields
/// the unique next status or fails with
/// [`TransitionError::InvalidTransition`]. There are no silent no-ops.
pub fn next_status(
    current: OrderItemStatus,
    trigger: Trigger,
) -> Result<OrderItemStatus, TransitionError> {
    use crate::status::OrderItemStatus::*;

    let next = match (current, trigger) {
        // Fulfillment path, strictly monotonic.
        (Paid, Trigger::Advance) => Some(ReadyShipment),
        (ReadyShipment, Trigger::Advance) => Some(Shipped),
        (Shipped, Trigger::Advance) => Some(Delivered),
        (Delivered, Trigger::Advance) => Some(PurchaseConfirmed),

        // Buyer confirmation only closes a delivered item.
        (Delivered, Trigger::ConfirmPurchase) => Some(PurchaseConfirmed),

        // Disputes may be filed from any pre-dispute state.
        (s, Trigger::Dispute(claim_type)) if s.is_pre_dispute() => {
            Some(claim_type.requested_status())
        }

        // Seller cancellation is only meaningful before delivery.
        (Paid | ReadyShipment | Shipped, Trigger::SellerCancel(reason)) => {
            Some(reason.cancelled_status())
        }

        // Decision outcomes on requested refund/exchange claims.
        (RefundRequested, Trigger::ClaimDecided(ClaimDecision::Approve)) => Some(RefundApproved),
        (RefundRequested, Trigger::ClaimDecided(ClaimDecision::Reject)) => Some(RefundRejected),
        (ExchangeRequested, Trigger::ClaimDecided(ClaimDecision::Approve)) => {
            Some(ExchangeApproved)
        }
        (ExchangeRequested, Trigger::ClaimDecided(ClaimDecision::Reject)) => {
            Some(ExchangeRejected)
        }

        _ => None,
    };

    next.ok_or(TransitionError::InvalidTransition {
        from: current,
        trigger,
    })
}

/// Computes the next status of a claim.
///
/// Only `REQUESTED` claims can be decided; deciding twice fails.
pub fn decide_claim(
    current: ClaimStatus,
    decision: ClaimDecision,
) -> Result<ClaimStatus, TransitionError> {
    match current {
        ClaimStatus::Requested => Ok(match decision {
            ClaimDecision::Approve => ClaimStatus::Approved,
            ClaimDecision::Reject => ClaimStatus::Rejected,
        }),
        already => Err(TransitionError::ClaimAlreadyDecided {
            from: already,
            decision,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::OrderItemStatus::*;

    const ALL_ITEM_STATUSES: [OrderItemStatus; 14] = [
        Paid,
        ReadyShipment,
        Shipped,
        Delivered,
        PurchaseConfirmed,
        Cancelled,
        CancelledEmpty,
        CancelledNoDelivery,
        RefundRequested,
        RefundApproved,
        RefundRejected,
        ExchangeRequested,
        ExchangeApproved,
        ExchangeRejected,
    ];

    #[test]
    fn advance_walks_the_fulfillment_path() {
        assert_eq!(next_status(Paid, Trigger::Advance).unwrap(), ReadyShipment);
        assert_eq!(
            next_status(ReadyShipment, Trigger::Advance).unwrap(),
            Shipped
        );
        assert_eq!(next_status(Shipped, Trigger::Advance).unwrap(), Delivered);
        assert_eq!(
            next_status(Delivered, Trigger::Advance).unwrap(),
            PurchaseConfirmed
        );
    }

    #[test]
    fn advance_fails_past_the_end_of_the_path() {
        let err = next_status(PurchaseConfirmed, Trigger::Advance).unwrap_err();
        assert!(matches!(
            err,
            TransitionError::InvalidTransition {
                from: PurchaseConfirmed,
                trigger: Trigger::Advance,
            }
        ));
    }

    #[test]
    fn advance_fails_from_every_dispute_state() {
        for status in ALL_ITEM_STATUSES {
            if status.is_dispute() || status.is_terminal() {
                assert!(
                    next_status(status, Trigger::Advance).is_err(),
                    "advance must fail from {status}"
                );
            }
        }
    }

    #[test]
    fn dispute_maps_claim_type_to_requested_status() {
        assert_eq!(
            next_status(Delivered, Trigger::Dispute(ClaimType::Refund)).unwrap(),
            RefundRequested
        );
        assert_eq!(
            next_status(Paid, Trigger::Dispute(ClaimType::Cancel)).unwrap(),
            Cancelled
        );
        assert_eq!(
            next_status(Shipped, Trigger::Dispute(ClaimType::Exchange)).unwrap(),
            ExchangeRequested
        );
    }

    #[test]
    fn dispute_rejected_after_confirmation_or_prior_dispute() {
        assert!(next_status(PurchaseConfirmed, Trigger::Dispute(ClaimType::Refund)).is_err());
        assert!(next_status(RefundRequested, Trigger::Dispute(ClaimType::Refund)).is_err());
        assert!(next_status(Cancelled, Trigger::Dispute(ClaimType::Cancel)).is_err());
    }

    #[test]
    fn seller_cancel_selects_terminal_by_reason() {
        assert_eq!(
            next_status(Paid, Trigger::SellerCancel(CancelReason::StockOut)).unwrap(),
            CancelledEmpty
        );
        assert_eq!(
            next_status(Shipped, Trigger::SellerCancel(CancelReason::Undeliverable)).unwrap(),
            CancelledNoDelivery
        );
    }

    #[test]
    fn seller_cancel_rejected_after_delivery() {
        assert!(next_status(Delivered, Trigger::SellerCancel(CancelReason::StockOut)).is_err());
        assert!(
            next_status(
                PurchaseConfirmed,
                Trigger::SellerCancel(CancelReason::Undeliverable)
            )
            .is_err()
        );
    }

    #[test]
    fn confirm_purchase_only_from_delivered() {
        assert_eq!(
            next_status(Delivered, Trigger::ConfirmPurchase).unwrap(),
            PurchaseConfirmed
        );
        for status in ALL_ITEM_STATUSES {
            if status != Delivered {
                assert!(
                    next_status(status, Trigger::ConfirmPurchase).is_err(),
                    "confirm must fail from {status}"
                );
            }
        }
    }

    #[test]
    fn claim_decision_moves_requested_items() {
        assert_eq!(
            next_status(RefundRequested, Trigger::ClaimDecided(ClaimDecision::Approve)).unwrap(),
            RefundApproved
        );
        assert_eq!(
            next_status(RefundRequested, Trigger::ClaimDecided(ClaimDecision::Reject)).unwrap(),
            RefundRejected
        );
        assert_eq!(
            next_status(
                ExchangeRequested,
                Trigger::ClaimDecided(ClaimDecision::Approve)
            )
            .unwrap(),
            ExchangeApproved
        );
        assert_eq!(
            next_status(
                ExchangeRequested,
                Trigger::ClaimDecided(ClaimDecision::Reject)
            )
            .unwrap(),
            ExchangeRejected
        );
    }

    #[test]
    fn claim_decision_rejected_elsewhere() {
        // A cancel claim leaves the item at CANCELLED; no decision trigger applies.
        assert!(next_status(Cancelled, Trigger::ClaimDecided(ClaimDecision::Approve)).is_err());
        assert!(next_status(Delivered, Trigger::ClaimDecided(ClaimDecision::Reject)).is_err());
        assert!(
            next_status(RefundApproved, Trigger::ClaimDecided(ClaimDecision::Approve)).is_err()
        );
    }

    #[test]
    fn engine_is_deterministic() {
        for status in ALL_ITEM_STATUSES {
            let a = next_status(status, Trigger::Advance);
            let b = next_status(status, Trigger::Advance);
            assert_eq!(a, b, "{status}");
        }
    }

    #[test]
    fn terminal_states_admit_no_trigger() {
        let triggers = [
            Trigger::Advance,
            Trigger::ConfirmPurchase,
            Trigger::Dispute(ClaimType::Refund),
            Trigger::SellerCancel(CancelReason::StockOut),
        ];
        for status in ALL_ITEM_STATUSES {
            if status.is_terminal() {
                for trigger in triggers {
                    assert!(
                        next_status(status, trigger).is_err(),
                        "{trigger} must fail from terminal {status}"
                    );
                }
            }
        }
    }

    #[test]
    fn decide_claim_once() {
        assert_eq!(
            decide_claim(ClaimStatus::Requested, ClaimDecision::Approve).unwrap(),
            ClaimStatus::Approved
        );
        assert_eq!(
            decide_claim(ClaimStatus::Requested, ClaimDecision::Reject).unwrap(),
            ClaimStatus::Rejected
        );
    }

    #[test]
    fn decide_claim_twice_fails() {
        for decided in [ClaimStatus::Approved, ClaimStatus::Rejected] {
            let err = decide_claim(decided, ClaimDecision::Approve).unwrap_err();
            assert!(matches!(err, TransitionError::ClaimAlreadyDecided { .. }));
        }
    }
}
