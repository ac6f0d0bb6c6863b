//! Filters for the buyer-facing list views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use domain::OrderItemStatus;

/// An inclusive calendar-date range, compared against the order's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// True if `date` falls inside the range, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Optional filters applied to the buyer order-history and claims views.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderHistoryFilter {
    /// Restrict to orders placed inside this date range.
    pub date_range: Option<DateRange>,

    /// Restrict items to exactly this status.
    pub status: Option<OrderItemStatus>,

    /// Case-sensitive substring matched against the product name or the
    /// seller's company name.
    pub keyword: Option<String>,
}
