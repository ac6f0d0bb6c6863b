//! Typed clients for the four services the order core depends on.
//!
//! Each owning service (payment, delivery, product, user) is reached through
//! its own trait; implementations are the in-memory fakes used by the test
//! suites and the `reqwest`-backed HTTP clients constructed once from
//! [`GatewayConfig`] and injected into the services that need them.
//!
//! Failure policy is split by call kind:
//! - read-enrichment calls degrade through [`fallback`] substitutes;
//! - side-effecting calls (payment notification, delivery writes) propagate
//!   [`GatewayError`];
//! - compensation deletes are fire-and-log at the call site.

pub mod delivery;
pub mod error;
pub mod fallback;
pub mod http;
pub mod payment;
pub mod product;
pub mod types;
pub mod user;

pub use delivery::{DeliveryGateway, InMemoryDeliveryGateway};
pub use error::{GatewayError, Result};
pub use http::{GatewayConfig, HttpDeliveryGateway, HttpGateways, HttpPaymentGateway,
    HttpProductGateway, HttpUserGateway};
pub use payment::{InMemoryPaymentGateway, PaymentGateway};
pub use product::{InMemoryProductGateway, ProductGateway};
pub use types::{Address, DeliveryRecord, DeliveryRequest, DeliveryStatus, Product};
pub use user::{InMemoryUserGateway, UserGateway};
