use super::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::utils::week_window;

/// Scripted order source: pages by index, details by order id
#[derive(Default)]
struct ScriptedSource {
    pages: Vec<Value>,
    details: HashMap<String, Value>,
    /// Page number that fails instead of answering
    failing_page: Option<u32>,
    /// Repeat the last page forever
    endless: bool,
    list_calls: Mutex<Vec<u32>>,
    detail_calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn with_pages(pages: Vec<Value>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    fn list_calls(&self) -> Vec<u32> {
        self.list_calls.lock().unwrap().clone()
    }

    fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderSource for ScriptedSource {
    async fn list_orders(
        &self,
        _location: &LocationConfig,
        _window: &WeekWindow,
        page: u32,
    ) -> SyncResult<Value> {
        self.list_calls.lock().unwrap().push(page);
        if self.failing_page == Some(page) {
            return Err(SyncError::Upstream {
                path: "/Orders/GetOrders".into(),
                status: Some(503),
                body: "unavailable".into(),
            });
        }
        let index = page as usize - 1;
        let body = match self.pages.get(index) {
            Some(body) => body.clone(),
            None if self.endless => self.pages.last().cloned().unwrap_or(json!([])),
            None => json!([]),
        };
        Ok(body)
    }

    async fn get_order(&self, _location: &LocationConfig, order_id: &str) -> SyncResult<Value> {
        self.detail_calls.lock().unwrap().push(order_id.to_string());
        self.details
            .get(order_id)
            .cloned()
            .ok_or_else(|| SyncError::Upstream {
                path: "/Orders/GetOrder".into(),
                status: Some(404),
                body: format!("order {order_id} not found"),
            })
    }
}

fn location() -> LocationConfig {
    LocationConfig {
        key: "uptown".into(),
        base_url: "https://uptown.example".into(),
        token: "t".into(),
    }
}

fn window() -> WeekWindow {
    week_window(NaiveDate::from_ymd_opt(2025, 10, 6).unwrap(), -240)
}

fn rows(count: usize) -> Value {
    let rows: Vec<Value> = (0..count)
        .map(|i| json!({"OrderID": i, "Lines": [{"CategoryName": "Food", "NetTotal": 1}]}))
        .collect();
    Value::Array(rows)
}

async fn run(source: &ScriptedSource) -> SyncResult<WeeklyTotals> {
    let hints = FoodHints::default();
    WeeklyAggregator::new(source, &hints)
        .aggregate(&location(), &window())
        .await
}

fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[tokio::test]
async fn test_two_order_week() {
    let source = ScriptedSource::with_pages(vec![json!({
        "Orders": [
            {
                "OrderID": "A",
                "Lines": [
                    {"CategoryName": "Food", "NetTotal": 10.00},
                    {"CategoryName": "Promotions", "DiscountAmount": 2.00}
                ]
            },
            {
                "OrderID": "B",
                "Status": "Void",
                "OrderDiscount": 1.00,
                "Lines": [{"CategoryName": "Food", "NetTotal": 5.00}]
            }
        ]
    })]);

    let totals = run(&source).await.unwrap();
    assert_eq!(totals.orders, 2);
    assert_eq!(totals.food_sales, dec(1000));
    assert_eq!(totals.voids, dec(500));
    assert_eq!(totals.promotions, dec(300));
    assert_eq!(source.list_calls(), [1]);
    assert!(source.detail_calls().is_empty());
}

#[tokio::test]
async fn test_voided_line_excluded_from_food() {
    let source = ScriptedSource::with_pages(vec![json!([{
        "OrderID": 1,
        "Lines": [
            {"CategoryName": "Kitchen - Hot Line", "NetTotal": 12.5, "IsVoid": true, "DiscountAmount": 0.5},
            {"CategoryName": "Kitchen - Hot Line", "NetTotal": 7.25},
            {"CategoryName": "Bar", "NetTotal": 9.0}
        ]
    }])]);

    let totals = run(&source).await.unwrap();
    assert_eq!(totals.food_sales, dec(725));
    assert_eq!(totals.voids, dec(1250));
    // Discount on a voided line still counts
    assert_eq!(totals.promotions, dec(50));
}

#[tokio::test]
async fn test_negative_amounts_are_clamped() {
    let source = ScriptedSource::with_pages(vec![json!([{
        "OrderID": 1,
        "OrderDiscount": -4,
        "Lines": [
            {"CategoryName": "Food", "NetTotal": 10},
            {"CategoryName": "Food", "NetTotal": -3, "DiscountAmount": -1},
            {"CategoryName": "Food", "NetTotal": -2, "Voided": true}
        ]
    }])]);

    let totals = run(&source).await.unwrap();
    assert_eq!(totals.food_sales, dec(1000));
    assert_eq!(totals.voids, Decimal::ZERO);
    assert_eq!(totals.promotions, Decimal::ZERO);
}

#[tokio::test]
async fn test_short_page_stops_paging() {
    let source = ScriptedSource::with_pages(vec![rows(PAGE_SIZE), rows(120), rows(3)]);
    let totals = run(&source).await.unwrap();
    assert_eq!(source.list_calls(), [1, 2]);
    assert_eq!(totals.orders, 620);
    assert_eq!(totals.food_sales, dec(62000));
}

#[tokio::test]
async fn test_full_pages_then_empty_page() {
    let source = ScriptedSource::with_pages(vec![rows(PAGE_SIZE), rows(PAGE_SIZE), json!([])]);
    let totals = run(&source).await.unwrap();
    assert_eq!(source.list_calls(), [1, 2, 3]);
    assert_eq!(totals.orders, 1000);
}

#[tokio::test]
async fn test_empty_first_page() {
    let source = ScriptedSource::with_pages(vec![json!({"Orders": []})]);
    let totals = run(&source).await.unwrap();
    assert_eq!(totals, WeeklyTotals::default());
    assert_eq!(source.list_calls(), [1]);
}

#[tokio::test]
async fn test_unrecognized_envelope_is_empty_page() {
    let source = ScriptedSource::with_pages(vec![json!({"Message": "no orders"})]);
    let totals = run(&source).await.unwrap();
    assert_eq!(totals.orders, 0);
}

#[tokio::test]
async fn test_explicit_has_more_overrides_page_size() {
    let mut first = serde_json::Map::new();
    first.insert("Orders".into(), rows(PAGE_SIZE));
    first.insert("HasMore".into(), json!(false));
    let source = ScriptedSource::with_pages(vec![Value::Object(first), rows(10)]);

    run(&source).await.unwrap();
    assert_eq!(source.list_calls(), [1]);
}

#[tokio::test]
async fn test_total_pages_keeps_short_pages_going() {
    let mut source = ScriptedSource::with_pages(vec![
        json!({"Orders": [{"OrderID": 1, "Lines": []}], "TotalPages": 2}),
        json!({"Orders": [{"OrderID": 2, "Lines": []}], "TotalPages": 2}),
    ]);
    source.details.insert("1".into(), json!({"OrderID": 1}));
    source.details.insert("2".into(), json!({"OrderID": 2}));

    let totals = run(&source).await.unwrap();
    assert_eq!(source.list_calls(), [1, 2]);
    assert_eq!(totals.orders, 2);
}

#[tokio::test]
async fn test_detail_fetched_when_lines_missing() {
    let mut source = ScriptedSource::with_pages(vec![json!([
        {"OrderId": "X-9", "Total": 40},
        {"OrderID": 7, "Lines": [{"CategoryName": "Food", "NetTotal": 3}]}
    ])]);
    source.details.insert(
        "X-9".into(),
        json!({"Order": {
            "OrderId": "X-9",
            "DiscountTotal": 2,
            "Items": [{"Category": "Food", "LineTotal": "15.50"}]
        }}),
    );

    let totals = run(&source).await.unwrap();
    assert_eq!(source.detail_calls(), ["X-9"]);
    assert_eq!(totals.orders, 2);
    assert_eq!(totals.food_sales, dec(1850));
    assert_eq!(totals.promotions, dec(200));
}

#[tokio::test]
async fn test_row_without_lines_or_id_is_counted_only() {
    let source = ScriptedSource::with_pages(vec![json!([{"Total": 40, "Discount": 1}])]);
    let totals = run(&source).await.unwrap();
    assert!(source.detail_calls().is_empty());
    assert_eq!(totals.orders, 1);
    assert_eq!(totals.food_sales, Decimal::ZERO);
    assert_eq!(totals.promotions, dec(100));
}

#[tokio::test]
async fn test_page_failure_fails_location() {
    let mut source = ScriptedSource::with_pages(vec![rows(PAGE_SIZE), rows(PAGE_SIZE)]);
    source.failing_page = Some(2);

    let err = run(&source).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(source.list_calls(), [1, 2]);
}

#[tokio::test]
async fn test_detail_failure_fails_location() {
    let source = ScriptedSource::with_pages(vec![json!([{"OrderID": "missing"}])]);
    let err = run(&source).await.unwrap_err();
    assert!(matches!(err, SyncError::Upstream { status: Some(404), .. }));
}

#[tokio::test]
async fn test_runaway_paging_is_bounded() {
    let mut source = ScriptedSource::with_pages(vec![json!({
        "Orders": [{"OrderID": 1, "Lines": [{"CategoryName": "Food", "NetTotal": 1}]}],
        "HasMore": true
    })]);
    source.endless = true;

    let err = run(&source).await.unwrap_err();
    assert!(matches!(err, SyncError::PageLimit { pages: MAX_PAGES }));
    assert_eq!(source.list_calls().len(), MAX_PAGES as usize);
}

#[tokio::test]
async fn test_totals_are_rounded_to_cents() {
    let source = ScriptedSource::with_pages(vec![json!([{
        "OrderID": 1,
        "Lines": [
            {"CategoryName": "Food", "NetTotal": 0.005},
            {"CategoryName": "Food", "NetTotal": 1.2345}
        ]
    }])]);
    let totals = run(&source).await.unwrap();
    // 1.2395 -> 1.24
    assert_eq!(totals.food_sales, dec(124));
}

#[test]
fn test_has_next_page() {
    assert!(has_next_page(1, PAGE_SIZE, Continuation::Unknown));
    assert!(!has_next_page(1, PAGE_SIZE - 1, Continuation::Unknown));
    assert!(!has_next_page(1, PAGE_SIZE, Continuation::HasMore(false)));
    assert!(has_next_page(1, 3, Continuation::HasMore(true)));
    assert!(has_next_page(2, 3, Continuation::TotalPages(3)));
    assert!(!has_next_page(3, PAGE_SIZE, Continuation::TotalPages(3)));
}

fn arb_line() -> impl Strategy<Value = (i64, i64, bool, bool)> {
    (-100_000i64..100_000, -10_000i64..10_000, any::<bool>(), any::<bool>())
}

proptest! {
    #[test]
    fn totals_never_negative_and_voids_never_count_as_food(
        lines in proptest::collection::vec(arb_line(), 0..40),
        header_discount in -10_000i64..10_000,
    ) {
        let json_lines: Vec<Value> = lines
            .iter()
            .map(|(amount, discount, voided, food)| json!({
                "CategoryName": if *food { "Kitchen" } else { "Bar" },
                "NetTotal": *amount as f64 / 100.0,
                "DiscountAmount": *discount as f64 / 100.0,
                "IsVoid": *voided,
            }))
            .collect();
        let source = ScriptedSource::with_pages(vec![json!([{
            "OrderID": 1,
            "OrderDiscount": header_discount as f64 / 100.0,
            "Lines": json_lines,
        }])]);

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let totals = runtime.block_on(run(&source)).unwrap();

        prop_assert!(totals.food_sales >= Decimal::ZERO);
        prop_assert!(totals.voids >= Decimal::ZERO);
        prop_assert!(totals.promotions >= Decimal::ZERO);

        let expected_food: i64 = lines
            .iter()
            .filter(|(_, _, voided, food)| !voided && *food)
            .map(|(amount, ..)| (*amount).max(0))
            .sum();
        prop_assert_eq!(totals.food_sales, dec(expected_food));
    }
}
