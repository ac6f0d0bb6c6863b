//! Read-side aggregation for the order lifecycle.
//!
//! Every view follows the same join pattern: fetch local entities from the
//! store, enrich each item through the external gateways (degrading to
//! fallback values when an owning service is down), compute derived totals,
//! then filter. Enrichment calls run concurrently per item, but results
//! always preserve the items' encounter order.

pub mod buyer;
pub mod detail;
pub mod error;
pub mod filter;
pub mod item;
pub mod seller;
pub mod summary;

pub use buyer::BuyerOrdersView;
pub use detail::{OrderDetail, OrderDetailView};
pub use error::{Result, ViewError};
pub use filter::{DateRange, OrderHistoryFilter};
pub use item::{EnrichedOrderItem, OrderView};
pub use seller::SellerOrdersView;
pub use summary::{ItemStatusCounts, OrderStatusCounts, item_status_counts, order_status_counts};
