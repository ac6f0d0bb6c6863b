//! Domain layer for the order lifecycle system.
//!
//! This crate provides:
//! - The locally-owned entity graph: [`Order`], [`OrderItem`], [`Claim`]
//! - [`Money`] amounts in integer currency units
//! - The status enums for the fulfillment and dispute pipelines
//! - The [`transition`] module — the single place where status values are
//!   computed

pub mod entity;
pub mod error;
pub mod money;
pub mod status;
pub mod transition;

pub use entity::{Claim, NewClaim, NewOrderItem, Order, OrderItem, applied_unit_price};
pub use error::TransitionError;
pub use money::Money;
pub use status::{CancelReason, ClaimStatus, ClaimType, OrderItemStatus};
pub use transition::{ClaimDecision, Trigger};
