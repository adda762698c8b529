//! Line item detail document types.
//!
//! Field names follow the commerce platform's PascalCase convention so the
//! embedded order and line items read the same as the rest of the document.

use orderfeed_commerce::{LineItem, Order};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-line report fields resolved from other resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItemMiscReportFields {
    #[serde(rename = "ID")]
    pub id: String,
    pub supplier_name: Option<String>,
    /// Name of the buyer organization the order came from.
    pub brand_name: Option<String>,
    pub tax: Option<Decimal>,
    pub line_tax_available: bool,
}

/// A purchase-order line item together with its purchase order's totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItemsWithPurchaseOrderFields {
    #[serde(rename = "ID")]
    pub id: String,
    /// ID of the purchase order, not of the buyer order.
    #[serde(rename = "OrderID")]
    pub order_id: String,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub unit_price: Option<Decimal>,
    #[serde(rename = "SupplierID")]
    pub supplier_id: Option<String>,
}

/// Composite record stored for one buyer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderLineItemData {
    pub order: Order,
    pub line_items: Vec<LineItem>,
    pub line_items_with_misc_fields: Vec<LineItemMiscReportFields>,
    pub line_items_with_purchase_order_fields: Vec<LineItemsWithPurchaseOrderFields>,
}
