//! Domain error types.

use thiserror::Error;

use crate::status::{ClaimStatus, OrderItemStatus};
use crate::transition::{ClaimDecision, Trigger};

/// Errors produced by the status transition engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The trigger is not permitted from the current item status.
    #[error("invalid transition: {trigger} not permitted from {from}")]
    InvalidTransition {
        from: OrderItemStatus,
        trigger: Trigger,
    },

    /// The claim has already been decided.
    #[error("claim is already {from}: cannot {decision} again")]
    ClaimAlreadyDecided {
        from: ClaimStatus,
        decision: ClaimDecision,
    },
}
