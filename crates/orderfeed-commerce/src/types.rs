//! Commerce platform resource types.
//!
//! The platform speaks PascalCase JSON with `ID`-suffixed identifiers and a
//! free-form `xp` ("extended properties") object on most resources. Orders
//! and line items keep every field they do not model in `extra`, so a
//! resource read here and written back out loses nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether an order is viewed from the receiving (`Incoming`) or the
/// submitting (`Outgoing`) side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Incoming,
    Outgoing,
}

impl OrderDirection {
    #[must_use]
    pub fn as_path(self) -> &'static str {
        match self {
            OrderDirection::Incoming => "Incoming",
            OrderDirection::Outgoing => "Outgoing",
        }
    }
}

impl std::fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_path())
    }
}

// ---------------------------------------------------------------------------
// List envelope
// ---------------------------------------------------------------------------

/// Paged list envelope: `{ "Meta": { ... }, "Items": [ ... ] }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPage<T> {
    pub meta: ListMeta,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

// ---------------------------------------------------------------------------
// Orders and line items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "FromCompanyID", default)]
    pub from_company_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_submitted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub tax_cost: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(rename = "xp", default)]
    pub xp: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ProductID", default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub line_subtotal: Decimal,
    #[serde(default)]
    pub line_total: Decimal,
    #[serde(rename = "SupplierID", default)]
    pub supplier_id: Option<String>,
    #[serde(rename = "xp", default)]
    pub xp: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Worksheet
// ---------------------------------------------------------------------------

/// Platform-computed aggregate view of an order, including the response of
/// the order-calculate integration (tax and shipping).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderWorksheet {
    pub order: Order,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub order_calculate_response: Option<OrderCalculateResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderCalculateResponse {
    #[serde(default)]
    pub shipping_total: Option<Decimal>,
    #[serde(default)]
    pub tax_total: Option<Decimal>,
    #[serde(rename = "xp", default)]
    pub xp: Option<OrderCalculateResponseXp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderCalculateResponseXp {
    #[serde(default)]
    pub tax_calculation: Option<OrderTaxCalculation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderTaxCalculation {
    /// Set to `"NotTaxable"` when the tax integration skipped the order.
    #[serde(rename = "ExternalTransactionID", default)]
    pub external_transaction_id: Option<String>,
    /// `None` when the platform sent no per-line breakdown at all.
    #[serde(default)]
    pub line_items: Option<Vec<LineItemTaxCalculation>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItemTaxCalculation {
    #[serde(rename = "LineItemID")]
    pub line_item_id: String,
    #[serde(default)]
    pub line_item_total_tax: Decimal,
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Buyer {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Supplier {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
}
