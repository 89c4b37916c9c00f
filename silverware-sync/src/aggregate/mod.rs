//! Weekly aggregation for one location
//!
//! Pages through the week's orders, fetches detail for rows without embedded
//! lines, and folds every line into [`WeeklyTotals`]. Any fetch error aborts the
//! whole location; nothing partial is returned.

use serde_json::Value;
use shared::money::to_decimal;
use shared::models::WeeklyTotals;

use crate::config::LocationConfig;
use crate::error::{SyncError, SyncResult};
use crate::silverware::OrderSource;
use crate::silverware::fields::{
    Continuation, FoodHints, PAGE_SIZE, classify_line, continuation, is_voided, order_detail,
    order_discount, order_id, order_lines, page_rows,
};
use crate::utils::WeekWindow;

/// Upper bound on pages fetched for one location and week
pub const MAX_PAGES: u32 = 1000;

pub struct WeeklyAggregator<'a> {
    source: &'a dyn OrderSource,
    hints: &'a FoodHints,
}

impl<'a> WeeklyAggregator<'a> {
    pub fn new(source: &'a dyn OrderSource, hints: &'a FoodHints) -> Self {
        Self { source, hints }
    }

    /// Totals for the location's week, rounded to cents
    pub async fn aggregate(
        &self,
        location: &LocationConfig,
        window: &WeekWindow,
    ) -> SyncResult<WeeklyTotals> {
        let mut totals = WeeklyTotals::default();
        let mut page: u32 = 1;

        loop {
            if page > MAX_PAGES {
                return Err(SyncError::PageLimit { pages: MAX_PAGES });
            }

            let body = self.source.list_orders(location, window, page).await?;
            let rows = page_rows(&body);
            tracing::debug!(location = %location.key, page, rows = rows.len(), "Fetched order page");
            if rows.is_empty() {
                break;
            }

            for row in rows {
                self.add_order(location, row, &mut totals).await?;
            }

            if !has_next_page(page, rows.len(), continuation(&body)) {
                break;
            }
            page += 1;
        }

        Ok(totals.rounded())
    }

    async fn add_order(
        &self,
        location: &LocationConfig,
        row: &Value,
        totals: &mut WeeklyTotals,
    ) -> SyncResult<()> {
        totals.orders += 1;

        let detail: Value;
        let order = if order_lines(row).is_empty() {
            match order_id(row) {
                Some(id) => {
                    detail = self.source.get_order(location, &id).await?;
                    order_detail(&detail)
                }
                None => {
                    tracing::debug!(location = %location.key, "Order row without lines or identifier");
                    row
                }
            }
        } else {
            row
        };

        let order_voided = is_voided(order);
        for line in order_lines(order) {
            let figures = classify_line(line, self.hints, order_voided);
            if figures.voided {
                totals.add_void(to_decimal(figures.amount));
            } else if figures.food {
                totals.add_food(to_decimal(figures.amount));
            }
            totals.add_promotion(to_decimal(figures.discount));
        }

        // Discounts recorded on the order header rather than per line
        totals.add_promotion(to_decimal(order_discount(order)));
        Ok(())
    }
}

/// Whether another page should be requested after a non-empty page
///
/// An explicit envelope signal wins over the short-page heuristic.
pub fn has_next_page(page: u32, rows: usize, hint: Continuation) -> bool {
    match hint {
        Continuation::HasMore(more) => more,
        Continuation::TotalPages(total) => u64::from(page) < total,
        Continuation::Unknown => rows >= PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests;
