//! Field extraction for Silverware order payloads
//!
//! Order and line records differ between Silverware API versions, so every
//! logical value is read from an ordered list of candidate fields. The first
//! candidate yielding a non-zero / non-empty value wins. Nothing here fails:
//! missing or malformed fields read as zero, empty or false.

use serde_json::Value;

/// Fixed page size for order listing
pub const PAGE_SIZE: usize = 500;

/// One candidate field of an upstream record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field(pub &'static str);

impl Field {
    fn get(self, record: &Value) -> Option<&Value> {
        record.as_object()?.get(self.0)
    }

    /// Numeric value; numeric strings are parsed, anything else is zero
    pub fn number(self, record: &Value) -> f64 {
        self.get(record).map(coerce_number).unwrap_or(0.0)
    }

    /// Trimmed string value, empty when absent or not a string
    pub fn text(self, record: &Value) -> &str {
        self.get(record)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
    }

    /// Boolean flag; accepts `true`, `"true"`, `"1"` and non-zero numbers
    pub fn flag(self, record: &Value) -> bool {
        match self.get(record) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => false,
        }
    }

    /// Strict boolean, None unless the field holds a JSON bool
    pub fn bool(self, record: &Value) -> Option<bool> {
        self.get(record).and_then(Value::as_bool)
    }

    pub fn array(self, record: &Value) -> Option<&[Value]> {
        self.get(record).and_then(Value::as_array).map(Vec::as_slice)
    }

    pub fn object(self, record: &Value) -> Option<&Value> {
        self.get(record).filter(|v| v.is_object())
    }

    /// Identifier as text; integer ids are rendered without decoration
    pub fn id(self, record: &Value) -> Option<String> {
        match self.get(record)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(number_id(n)),
            _ => None,
        }
    }
}

/// Integral ids render as integers even when sent as floats (`12.0` -> `12`)
fn number_id(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Numeric coercion: numbers pass through, strings are parsed, else zero
pub fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

// ── Candidate lists (priority order) ──

pub const LINE_AMOUNT: &[Field] = &[
    Field("NetTotal"),
    Field("LineTotal"),
    Field("Total"),
    Field("ExtendedPrice"),
    Field("Amount"),
    Field("Price"),
];

pub const LINE_DISCOUNT: &[Field] = &[
    Field("DiscountAmount"),
    Field("Discount"),
    Field("DiscountTotal"),
];

pub const CATEGORY: &[Field] = &[
    Field("CategoryName"),
    Field("Category"),
    Field("MenuCategory"),
    Field("ReportingCategory"),
    Field("DepartmentName"),
];

pub const VOID_FLAGS: &[Field] = &[
    Field("IsVoid"),
    Field("Voided"),
    Field("IsVoided"),
    Field("Void"),
];

pub const VOID_STATUS: &[Field] = &[Field("Status"), Field("LineStatus"), Field("ItemStatus")];

pub const LINE_COLLECTIONS: &[Field] = &[
    Field("Lines"),
    Field("Items"),
    Field("OrderLines"),
    Field("LineItems"),
    Field("OrderItems"),
    Field("Details"),
];

pub const ORDER_ID: &[Field] = &[Field("OrderID"), Field("OrderId"), Field("Id")];

pub const ORDER_DISCOUNT: &[Field] = &[
    Field("OrderDiscount"),
    Field("DiscountTotal"),
    Field("TotalDiscount"),
    Field("Discount"),
];

pub const ROW_ENVELOPES: &[Field] = &[
    Field("Orders"),
    Field("Data"),
    Field("Items"),
    Field("Results"),
    Field("Rows"),
];

pub const DETAIL_ENVELOPES: &[Field] = &[Field("Order"), Field("Data")];

pub const HAS_MORE: &[Field] = &[Field("HasMore"), Field("HasNextPage")];

pub const TOTAL_PAGES: Field = Field("TotalPages");

// ── Probes ──

/// First non-zero numeric candidate, else zero
pub fn first_number(record: &Value, candidates: &[Field]) -> f64 {
    candidates
        .iter()
        .map(|f| f.number(record))
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}

/// First non-empty text candidate, lowercased, else empty
pub fn first_text_lower(record: &Value, candidates: &[Field]) -> String {
    candidates
        .iter()
        .map(|f| f.text(record))
        .find(|s| !s.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// First present array candidate, else empty
pub fn first_array<'a>(record: &'a Value, candidates: &[Field]) -> &'a [Value] {
    candidates
        .iter()
        .find_map(|f| f.array(record))
        .unwrap_or(&[])
}

pub fn line_amount(line: &Value) -> f64 {
    first_number(line, LINE_AMOUNT)
}

pub fn line_discount(line: &Value) -> f64 {
    first_number(line, LINE_DISCOUNT)
}

pub fn category_name(line: &Value) -> String {
    first_text_lower(line, CATEGORY)
}

/// Voided when any flag is set or any status reads `void`/`voided`
pub fn is_voided(record: &Value) -> bool {
    VOID_FLAGS.iter().any(|f| f.flag(record))
        || VOID_STATUS.iter().any(|f| {
            let status = f.text(record);
            status.eq_ignore_ascii_case("void") || status.eq_ignore_ascii_case("voided")
        })
}

pub fn order_lines(order: &Value) -> &[Value] {
    first_array(order, LINE_COLLECTIONS)
}

pub fn order_id(order: &Value) -> Option<String> {
    ORDER_ID.iter().find_map(|f| f.id(order))
}

pub fn order_discount(order: &Value) -> f64 {
    first_number(order, ORDER_DISCOUNT)
}

/// Rows of a list response: a bare array, or the first known envelope field
///
/// An unrecognized shape reads as an empty page.
pub fn page_rows(body: &Value) -> &[Value] {
    match body {
        Value::Array(rows) => rows.as_slice(),
        _ => first_array(body, ROW_ENVELOPES),
    }
}

/// Order record of a detail response, unwrapped from a known envelope
pub fn order_detail(body: &Value) -> &Value {
    DETAIL_ENVELOPES
        .iter()
        .find_map(|f| f.object(body))
        .unwrap_or(body)
}

/// Paging hint carried by a list response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Explicit `HasMore` / `HasNextPage`
    HasMore(bool),
    /// Explicit `TotalPages`
    TotalPages(u64),
    /// No signal, fall back to the page-size heuristic
    Unknown,
}

pub fn continuation(body: &Value) -> Continuation {
    if let Some(more) = HAS_MORE.iter().find_map(|f| f.bool(body)) {
        return Continuation::HasMore(more);
    }
    let total = TOTAL_PAGES.number(body);
    if total >= 1.0 {
        return Continuation::TotalPages(total as u64);
    }
    Continuation::Unknown
}

// ── Food classification ──

/// Lowercased category hints; a category containing any hint is food
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodHints(Vec<String>);

impl Default for FoodHints {
    fn default() -> Self {
        Self(vec!["food".into(), "kitchen".into()])
    }
}

impl FoodHints {
    /// Parse a comma-separated list; falls back to the defaults when no hint is usable
    pub fn parse(raw: &str) -> Self {
        let hints: Vec<String> = raw
            .split(',')
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        if hints.is_empty() {
            tracing::warn!(raw = %raw, "No usable food category hints, using defaults");
            return Self::default();
        }
        Self(hints)
    }

    pub fn hints(&self) -> &[String] {
        &self.0
    }

    /// Case-insensitive substring match against any hint
    pub fn is_food(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.0.iter().any(|hint| category.contains(hint.as_str()))
    }
}

/// Extracted figures of one order line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFigures {
    pub amount: f64,
    pub discount: f64,
    pub voided: bool,
    pub food: bool,
}

/// Classify a line; lines of a voided order are voided too
pub fn classify_line(line: &Value, hints: &FoodHints, order_voided: bool) -> LineFigures {
    LineFigures {
        amount: line_amount(line),
        discount: line_discount(line),
        voided: order_voided || is_voided(line),
        food: hints.is_food(&category_name(line)),
    }
}
