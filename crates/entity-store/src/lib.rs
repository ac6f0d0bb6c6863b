//! Durable storage for the order lifecycle entities.
//!
//! The [`EntityStore`] trait provides primary-key and secondary-attribute
//! lookups for orders, order items, and claims, plus the two write guarantees
//! the rest of the system relies on:
//!
//! - order insertion enforces uniqueness of the external payment reference
//!   (and of the order number itself) atomically with the insert;
//! - status updates are compare-and-set — a concurrent conflicting transition
//!   makes one caller fail with a typed conflict instead of overwriting.
//!
//! Two backends are provided: [`InMemoryEntityStore`] (the test reference)
//! and [`PostgresEntityStore`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{EntityStoreError, Result};
pub use memory::InMemoryEntityStore;
pub use postgres::PostgresEntityStore;
pub use store::{ClaimDecisionUpdate, EntityStore};
