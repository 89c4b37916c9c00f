//! Weekly Override Model
//!
//! One record per location per week, merged into the document store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{non_negative, round_money, to_f64};

/// Every run scans one full week
pub const DAYS_SCANNED: u32 = 7;

/// Running weekly totals for one location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklyTotals {
    /// Orders seen across all pages
    pub orders: u64,
    /// Non-voided food line amounts
    pub food_sales: Decimal,
    /// Voided line amounts
    pub voids: Decimal,
    /// Line and order-level discounts (persisted as `comps`)
    pub promotions: Decimal,
}

impl WeeklyTotals {
    pub fn add_food(&mut self, amount: Decimal) {
        self.food_sales += non_negative(amount);
    }

    pub fn add_void(&mut self, amount: Decimal) {
        self.voids += non_negative(amount);
    }

    pub fn add_promotion(&mut self, amount: Decimal) {
        self.promotions += non_negative(amount);
    }

    /// Totals rounded to cents
    pub fn rounded(self) -> Self {
        Self {
            orders: self.orders,
            food_sales: round_money(self.food_sales),
            voids: round_money(self.voids),
            promotions: round_money(self.promotions),
        }
    }
}

/// Metadata sub-record of an override document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideMeta {
    pub orders: u64,
    pub days_scanned: u32,
    pub last_run: DateTime<Utc>,
}

/// Persisted weekly override (field names match the stored schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideDocument {
    pub food_sales: f64,
    pub voids: f64,
    pub comps: f64,
    pub meta: OverrideMeta,
}

impl OverrideDocument {
    pub fn from_totals(totals: &WeeklyTotals, last_run: DateTime<Utc>) -> Self {
        Self {
            food_sales: to_f64(totals.food_sales),
            voids: to_f64(totals.voids),
            comps: to_f64(totals.promotions),
            meta: OverrideMeta {
                orders: totals.orders,
                days_scanned: DAYS_SCANNED,
                last_run,
            },
        }
    }
}
