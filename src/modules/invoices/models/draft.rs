// Working state for composing or editing an invoice.
//
// The draft is a plain value owned by the caller: each operation consumes it
// and hands back the next state. Nothing about an in-progress invoice lives on
// the server between requests.

use serde::Serialize;

use super::invoice::{Invoice, InvoiceCharges, InvoiceRevision, InvoiceTotals};
use super::line_item::LineItem;
use crate::core::{AppError, Result};
use crate::modules::invoices::services::invoice_aggregator::compute_invoice_totals;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvoiceDraft {
    customer_id: Option<i64>,
    items: Vec<LineItem>,
    charges: InvoiceCharges,
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_customer(customer_id: i64) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Self::default()
        }
    }

    /// Load a stored invoice back into an editable draft
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            customer_id: Some(invoice.customer_id),
            items: invoice.items().to_vec(),
            charges: *invoice.charges(),
        }
    }

    pub fn with_customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    /// Drop the item at `index` (0-based); later items move up one place
    pub fn without_item(mut self, index: usize) -> Result<Self> {
        if index >= self.items.len() {
            return Err(AppError::validation(format!(
                "No item at position {} (draft has {} items)",
                index + 1,
                self.items.len()
            )));
        }

        self.items.remove(index);
        Ok(self)
    }

    pub fn with_charges(mut self, charges: InvoiceCharges) -> Self {
        self.charges = charges;
        self
    }

    pub fn cleared(mut self) -> Self {
        self.items.clear();
        self
    }

    pub fn customer_id(&self) -> Option<i64> {
        self.customer_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn charges(&self) -> &InvoiceCharges {
        &self.charges
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current totals of the draft
    pub fn totals(&self) -> Result<InvoiceTotals> {
        compute_invoice_totals(&self.items, &self.charges)
    }

    /// Freeze the items and charges into a persistable revision
    pub fn into_revision(self) -> Result<InvoiceRevision> {
        InvoiceRevision::new(self.items, self.charges)
    }
}
