//! View error types.
//!
//! Enrichment failures never surface here — they degrade to fallback values
//! at the point of use. Only structural problems (missing entities, storage
//! failures) reach the caller.

use thiserror::Error;

use common::OrderNumber;
use entity_store::EntityStoreError;

/// Errors that can occur while assembling a view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The requested order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderNumber),

    /// The entity store failed.
    #[error("storage error")]
    Store(#[from] EntityStoreError),
}

/// Result type for view assembly.
pub type Result<T> = std::result::Result<T, ViewError>;
