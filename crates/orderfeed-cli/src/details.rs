//! Read-only views of stored line item detail documents.

use clap::Subcommand;
use orderfeed_core::labels::yes_no_label;
use orderfeed_core::LINE_ITEM_DETAIL_PARTITION;
use serde_json::Value;

/// Sub-commands available under `details`.
#[derive(Debug, Subcommand)]
pub enum DetailsCommands {
    /// Print the stored document for an order
    Show {
        /// Incoming order ID
        order_id: String,
    },
}

/// Prints the stored document's metadata and one row per misc-fields entry.
///
/// # Errors
///
/// Returns an error if no document exists for `order_id` or the query fails.
pub(crate) async fn run_details_show(pool: &sqlx::PgPool, order_id: &str) -> anyhow::Result<()> {
    let Some(row) =
        orderfeed_db::get_line_item_detail(pool, LINE_ITEM_DETAIL_PARTITION, order_id).await?
    else {
        tracing::warn!(order_id, partition = LINE_ITEM_DETAIL_PARTITION, "no stored document");
        anyhow::bail!("no line item detail for order '{order_id}'; run `job receive-line-items` first");
    };
    tracing::debug!(order_id, document_id = %row.id, "loaded line item detail");

    println!("Document: {}", row.id);
    println!("Order:    {}", row.order_id);
    println!("Updated:  {}", row.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();

    let misc = row
        .data
        .get("LineItemsWithMiscFields")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if misc.is_empty() {
        println!("no line items");
        return Ok(());
    }

    println!("{}", misc_header());
    for entry in misc {
        println!("{}", format_misc_row(entry));
    }

    let po_lines = row
        .data
        .get("LineItemsWithPurchaseOrderFields")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    println!();
    println!("{po_lines} purchase order line(s)");

    Ok(())
}

fn misc_header() -> String {
    format!(
        "{:<20}{:<24}{:<24}{:<12}TAX AVAILABLE",
        "LINE ITEM", "SUPPLIER", "BRAND", "TAX"
    )
}

/// Renders one `LineItemsWithMiscFields` entry as a table row.
pub(crate) fn format_misc_row(entry: &Value) -> String {
    let available = entry.get("LineTaxAvailable").unwrap_or(&Value::Null);
    format!(
        "{:<20}{:<24}{:<24}{:<12}{}",
        text(entry.get("ID")),
        text(entry.get("SupplierName")),
        text(entry.get("BrandName")),
        text(entry.get("Tax")),
        yes_no_label(available)
    )
}

/// Display text for a scalar JSON value, or an em dash when absent or null.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "\u{2014}".to_string(),
        Some(other) => other.to_string(),
    }
}
