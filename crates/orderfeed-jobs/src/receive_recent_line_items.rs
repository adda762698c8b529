//! Builds and stores the line item detail document for one buyer order.
//!
//! The message is an order ID. The job reads the incoming order's worksheet,
//! line items and buyer, resolves supplier names and per-line tax, collects
//! the outgoing purchase orders split from the order, and upserts one
//! document keyed by the order ID. Every call is sequential; any failure
//! ends the run as [`ResultCode::PermanentFailure`].

use std::collections::HashMap;
use std::sync::Arc;

use orderfeed_commerce::{CommerceClient, LineItem, OrderDirection, OrderWorksheet};
use orderfeed_core::LINE_ITEM_DETAIL_PARTITION;

use crate::assemble::{misc_fields, purchase_order_fields, purchase_order_filter};
use crate::documents::{LineItemMiscReportFields, LineItemsWithPurchaseOrderFields, OrderLineItemData};
use crate::error::JobError;
use crate::job::{ReportJob, ResultCode};
use crate::store::LineItemDetailStore;

pub struct ReceiveRecentLineItemsJob<S> {
    commerce: Arc<CommerceClient>,
    store: S,
}

impl<S: LineItemDetailStore> ReceiveRecentLineItemsJob<S> {
    pub fn new(commerce: Arc<CommerceClient>, store: S) -> Self {
        Self { commerce, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds the document for `order_id` and upserts it, returning the id
    /// it was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`JobError`] on the first failing commerce call or store
    /// operation. Nothing is written unless every read succeeded.
    pub async fn upsert_line_item_detail(&self, order_id: &str) -> Result<String, JobError> {
        let worksheet = self
            .commerce
            .get_worksheet(OrderDirection::Incoming, order_id)
            .await?;

        let line_items = self
            .commerce
            .list_all_line_items(OrderDirection::Incoming, order_id)
            .await?;

        let buyer_id = worksheet
            .order
            .from_company_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| JobError::MissingBuyer {
                order_id: order_id.to_owned(),
            })?;
        let buyer = self.commerce.get_buyer(buyer_id).await?;

        let line_items_with_misc_fields = self
            .build_misc_fields(&line_items, &worksheet, &buyer.name)
            .await?;

        let line_items_with_purchase_order_fields =
            self.build_purchase_order_fields(order_id).await?;

        tracing::debug!(
            order_id,
            line_items = line_items.len(),
            purchase_order_lines = line_items_with_purchase_order_fields.len(),
            "assembled line item detail"
        );

        let data = OrderLineItemData {
            order: worksheet.order,
            line_items,
            line_items_with_misc_fields,
            line_items_with_purchase_order_fields,
        };

        let existing = self
            .store
            .find_ids_by_order(LINE_ITEM_DETAIL_PARTITION, order_id)
            .await?;
        let existing_id = match existing.as_slice() {
            [only] => Some(only.as_str()),
            [] => None,
            many => {
                tracing::warn!(
                    order_id,
                    matches = many.len(),
                    "multiple stored documents for order; writing a new one"
                );
                None
            }
        };

        let id = self
            .store
            .upsert(existing_id, LINE_ITEM_DETAIL_PARTITION, order_id, &data)
            .await?;
        Ok(id)
    }

    async fn build_misc_fields(
        &self,
        line_items: &[LineItem],
        worksheet: &OrderWorksheet,
        buyer_name: &str,
    ) -> Result<Vec<LineItemMiscReportFields>, JobError> {
        let mut supplier_names: HashMap<String, String> = HashMap::new();
        let mut rows = Vec::with_capacity(line_items.len());

        for line_item in line_items {
            let supplier_name = match line_item.supplier_id.as_deref() {
                Some(supplier_id) if !supplier_id.is_empty() => {
                    if let Some(name) = supplier_names.get(supplier_id) {
                        Some(name.clone())
                    } else {
                        let supplier = self.commerce.get_supplier(supplier_id).await?;
                        supplier_names.insert(supplier_id.to_owned(), supplier.name.clone());
                        Some(supplier.name)
                    }
                }
                _ => None,
            };

            rows.push(misc_fields(line_item, supplier_name, buyer_name, worksheet)?);
        }

        Ok(rows)
    }

    async fn build_purchase_order_fields(
        &self,
        order_id: &str,
    ) -> Result<Vec<LineItemsWithPurchaseOrderFields>, JobError> {
        let filter = purchase_order_filter(order_id);
        let purchase_orders = self
            .commerce
            .list_all_orders(OrderDirection::Outgoing, &[("ID", filter.as_str())])
            .await?;

        let mut rows = Vec::new();
        for purchase_order in &purchase_orders {
            let po_line_items = self
                .commerce
                .list_all_line_items(OrderDirection::Outgoing, &purchase_order.id)
                .await?;
            if po_line_items.is_empty() {
                continue;
            }
            rows.extend(purchase_order_fields(purchase_order, &po_line_items));
        }

        Ok(rows)
    }

    fn log_failure(&self, order_id: &str, err: &JobError) {
        tracing::error!(
            job = self.name(),
            order_id,
            error = %err,
            chain = %error_chain(err),
            detail = ?err,
            "failed to upsert line item detail"
        );
    }
}

impl<S: LineItemDetailStore> ReportJob for ReceiveRecentLineItemsJob<S> {
    fn name(&self) -> &'static str {
        "receive_recent_line_items"
    }

    async fn process_job(&self, message: &str) -> ResultCode {
        let order_id = message.trim();
        let result = if order_id.is_empty() {
            Err(JobError::InvalidMessage("order ID is empty".to_owned()))
        } else {
            self.upsert_line_item_detail(order_id).await
        };

        match result {
            Ok(id) => {
                tracing::info!(order_id, document_id = %id, "line item detail upserted");
                ResultCode::Success
            }
            Err(err) => {
                self.log_failure(order_id, &err);
                ResultCode::PermanentFailure
            }
        }
    }
}

/// Renders an error and all of its sources as `outer: inner: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
