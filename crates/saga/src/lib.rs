//! Write-side coordination for the order lifecycle.
//!
//! Three services cover every state-changing operation of the core:
//!
//! - [`CreationSaga`] — the order creation saga: duplicate-payment guard,
//!   order-number allocation, local persistence, payment notification, and
//!   best-effort compensation on failure.
//! - [`FulfillmentService`] — seller-side fulfillment: advancing items along
//!   the fulfillment path (driving the delivery service), seller
//!   cancellation, and buyer purchase confirmation.
//! - [`ClaimService`] — the dispute pipeline: filing claims, deciding them,
//!   and the seller-facing claim listing.
//!
//! Status values are never computed here; every transition goes through
//! `domain::transition` and is persisted with the store's compare-and-set
//! update.

pub mod claims;
pub mod creation;
pub mod error;
pub mod fulfillment;

pub use claims::{ClaimService, ClaimStatusCounts, ClaimSummary, claim_status_counts};
pub use creation::{CreateOrderRequest, CreationSaga, OrderLine};
pub use error::{OrderError, Result};
pub use fulfillment::FulfillmentService;
