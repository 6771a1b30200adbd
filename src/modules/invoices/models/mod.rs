mod draft;
mod invoice;
mod line_item;

pub use draft::InvoiceDraft;
pub use invoice::{
    CreateInvoiceRequest, ImportReport, ImportedInvoice, ImportedLineItem, Invoice,
    InvoiceCharges, InvoiceNumber, InvoicePreview, InvoiceResponse, InvoiceRevision, InvoiceSummary,
    InvoiceTotals, LineItemInput, NewInvoice, ReviseInvoiceRequest,
};
pub use line_item::{LineAmounts, LineItem};
