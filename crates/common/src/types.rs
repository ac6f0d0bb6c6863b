use serde::{Deserialize, Serialize};

/// Defines an `i64`-backed identifier newtype.
///
/// All numeric keys in the system (store-assigned primary keys and
/// references into the owning services) share the same shape: transparent
/// serde representation, `Display`, and conversions from/to the raw value.
macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier value.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier value.
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

numeric_id! {
    /// Store-assigned primary key of an order line item.
    OrderItemId
}

numeric_id! {
    /// Store-assigned primary key of a claim.
    ClaimId
}

numeric_id! {
    /// Reference to a user account (buyer or seller) owned by the user service.
    UserId
}

numeric_id! {
    /// Reference to a product owned by the product service.
    ProductId
}

numeric_id! {
    /// Reference to a payment owned by the payment service.
    ///
    /// Unique per order; order creation is idempotent over this value.
    PaymentId
}

numeric_id! {
    /// Reference to a delivery address owned by the delivery service.
    AddressId
}

/// Identity of an order.
///
/// Generated at creation time as `<YYYYMMDD><4-digit-random>` and reused by
/// the delivery service as the shipment tracking reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Creates an order number from an existing string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
