//! Fallback values for read-enrichment calls.
//!
//! Views must render even when an owning service is down, so every
//! read-enrichment lookup degrades to a fixed substitute here. Write calls
//! never come through this module.

use common::{AddressId, UserId};

use crate::error::Result;
use crate::types::{Address, Product};

/// Substitute company name when the user service is unreachable.
pub const PLACEHOLDER_COMPANY_NAME: &str = "(seller unavailable)";

/// Substitute display name when the user service is unreachable.
pub const PLACEHOLDER_USER_NAME: &str = "(unknown user)";

/// Substitute product name when the product service is unreachable.
pub const PLACEHOLDER_PRODUCT_NAME: &str = "(product unavailable)";

/// Card-brand marker when the payment service is unreachable.
pub const CARD_TYPE_UNKNOWN: &str = "UNKNOWN";

/// The fixed placeholder address used when the delivery service is
/// unreachable.
pub fn placeholder_address() -> Address {
    Address {
        recipient_name: PLACEHOLDER_USER_NAME.to_string(),
        recipient_tel: String::new(),
        recipient_addr1: String::new(),
        recipient_addr2: String::new(),
        recipient_zipcode: String::new(),
        recipient_req: String::new(),
    }
}

/// The fixed placeholder product used when the product service is
/// unreachable.
pub fn placeholder_product() -> Product {
    Product {
        name: PLACEHOLDER_PRODUCT_NAME.to_string(),
        image: String::new(),
        seller_id: UserId::new(0),
        seller_address_id: AddressId::new(0),
        courier_name: String::new(),
    }
}

/// Degrades a failed address lookup to the placeholder address.
pub fn address_or_placeholder(result: Result<Address>) -> Address {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "address enrichment failed; using placeholder");
        placeholder_address()
    })
}

/// Degrades a failed product lookup to the placeholder product.
pub fn product_or_placeholder(result: Result<Product>) -> Product {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "product enrichment failed; using placeholder");
        placeholder_product()
    })
}

/// Degrades a failed company-name lookup to the placeholder name.
pub fn company_name_or_placeholder(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "company name enrichment failed; using placeholder");
        PLACEHOLDER_COMPANY_NAME.to_string()
    })
}

/// Degrades a failed display-name lookup to the placeholder name.
pub fn display_name_or_placeholder(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "display name enrichment failed; using placeholder");
        PLACEHOLDER_USER_NAME.to_string()
    })
}

/// Degrades a failed card-type lookup to the unknown marker.
pub fn card_type_or_unknown(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "card type enrichment failed; using placeholder");
        CARD_TYPE_UNKNOWN.to_string()
    })
}
