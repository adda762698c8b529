//! Pure joins from commerce resources to document rows.

use orderfeed_commerce::{LineItem, Order, OrderTaxCalculation, OrderWorksheet};
use rust_decimal::Decimal;

use crate::documents::{LineItemMiscReportFields, LineItemsWithPurchaseOrderFields};
use crate::error::JobError;

/// `ExternalTransactionID` the tax integration writes for untaxed orders.
pub const NOT_TAXABLE: &str = "NotTaxable";

/// Filter matching every purchase order split from `order_id`.
#[must_use]
pub fn purchase_order_filter(order_id: &str) -> String {
    format!("{order_id}-*")
}

/// The calculation to read per-line tax from, or `None` when the order is
/// untaxed. A calculate response whose `xp` lacks `TaxCalculation` is an
/// error, not an untaxed order.
fn taxable_calculation(
    worksheet: &OrderWorksheet,
) -> Result<Option<&OrderTaxCalculation>, JobError> {
    let Some(xp) = worksheet
        .order_calculate_response
        .as_ref()
        .and_then(|response| response.xp.as_ref())
    else {
        return Ok(None);
    };

    let calc = xp
        .tax_calculation
        .as_ref()
        .ok_or_else(|| JobError::IncompleteTaxCalculation {
            order_id: worksheet.order.id.clone(),
            missing: "TaxCalculation",
        })?;

    if calc.external_transaction_id.as_deref() == Some(NOT_TAXABLE) {
        return Ok(None);
    }
    Ok(Some(calc))
}

/// Tax for one line item and whether a tax line was found for it.
///
/// Returns `(None, false)` when the worksheet has no calculate response or
/// `xp`, when the order was marked not taxable, or when no tax line matches.
///
/// # Errors
///
/// [`JobError::IncompleteTaxCalculation`] when `xp` is present without a
/// `TaxCalculation`, or a taxable calculation has no `LineItems`.
pub fn line_tax(
    worksheet: &OrderWorksheet,
    line_item_id: &str,
) -> Result<(Option<Decimal>, bool), JobError> {
    let Some(calc) = taxable_calculation(worksheet)? else {
        return Ok((None, false));
    };

    let lines = calc
        .line_items
        .as_deref()
        .ok_or_else(|| JobError::IncompleteTaxCalculation {
            order_id: worksheet.order.id.clone(),
            missing: "TaxCalculation.LineItems",
        })?;

    Ok(lines
        .iter()
        .find(|line| line.line_item_id == line_item_id)
        .map_or((None, false), |line| (Some(line.line_item_total_tax), true)))
}

/// # Errors
///
/// Propagates [`line_tax`] failures.
pub fn misc_fields(
    line_item: &LineItem,
    supplier_name: Option<String>,
    buyer_name: &str,
    worksheet: &OrderWorksheet,
) -> Result<LineItemMiscReportFields, JobError> {
    let (tax, line_tax_available) = line_tax(worksheet, &line_item.id)?;
    Ok(LineItemMiscReportFields {
        id: line_item.id.clone(),
        supplier_name,
        brand_name: Some(buyer_name.to_owned()),
        tax,
        line_tax_available,
    })
}

/// One row per purchase-order line item, carrying the purchase order's totals.
#[must_use]
pub fn purchase_order_fields(
    purchase_order: &Order,
    line_items: &[LineItem],
) -> Vec<LineItemsWithPurchaseOrderFields> {
    line_items
        .iter()
        .map(|line_item| LineItemsWithPurchaseOrderFields {
            id: line_item.id.clone(),
            order_id: purchase_order.id.clone(),
            subtotal: purchase_order.subtotal,
            total: purchase_order.total,
            unit_price: line_item.unit_price,
            supplier_id: line_item.supplier_id.clone(),
        })
        .collect()
}
